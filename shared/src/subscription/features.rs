//! Tier → capability and tier → quota tables
//!
//! Both tables are static. Each tier's feature list starts with the full list
//! of the tier below it, so feature sets only grow going up.

use serde::{Deserialize, Serialize};

use super::SubscriptionTier;

/// Named product capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Embeddable storefront chat widget
    ChatWidget,
    /// Document upload into the bot's knowledge base
    KnowledgeBase,
    ConversationHistory,
    /// Flag conversations that look like purchase intent
    LeadDetection,
    CustomBranding,
    Analytics,
    LeadExport,
    PrioritySupport,
    ApiAccess,
    MultiStore,
    SingleSignOn,
    DedicatedSupport,
}

const FREE: &[Feature] = &[Feature::ChatWidget, Feature::KnowledgeBase];

const BASIC: &[Feature] = &[
    Feature::ChatWidget,
    Feature::KnowledgeBase,
    Feature::ConversationHistory,
    Feature::LeadDetection,
];

const PRO: &[Feature] = &[
    Feature::ChatWidget,
    Feature::KnowledgeBase,
    Feature::ConversationHistory,
    Feature::LeadDetection,
    Feature::CustomBranding,
    Feature::Analytics,
    Feature::LeadExport,
];

const ULTRA: &[Feature] = &[
    Feature::ChatWidget,
    Feature::KnowledgeBase,
    Feature::ConversationHistory,
    Feature::LeadDetection,
    Feature::CustomBranding,
    Feature::Analytics,
    Feature::LeadExport,
    Feature::PrioritySupport,
    Feature::ApiAccess,
];

const ENTERPRISE: &[Feature] = &[
    Feature::ChatWidget,
    Feature::KnowledgeBase,
    Feature::ConversationHistory,
    Feature::LeadDetection,
    Feature::CustomBranding,
    Feature::Analytics,
    Feature::LeadExport,
    Feature::PrioritySupport,
    Feature::ApiAccess,
    Feature::MultiStore,
    Feature::SingleSignOn,
    Feature::DedicatedSupport,
];

/// Ordered capability list for a tier
pub fn features_for(tier: SubscriptionTier) -> &'static [Feature] {
    match tier {
        SubscriptionTier::Free => FREE,
        SubscriptionTier::Basic => BASIC,
        SubscriptionTier::Pro => PRO,
        SubscriptionTier::Ultra => ULTRA,
        SubscriptionTier::Enterprise => ENTERPRISE,
    }
}

/// Usage limits for a tier, 0 = unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierQuota {
    /// Knowledge-base documents that can be uploaded
    pub max_documents: u32,
    pub max_conversations_per_month: u32,
    pub max_chatbots: u32,
}

pub fn quota_for(tier: SubscriptionTier) -> TierQuota {
    match tier {
        SubscriptionTier::Free => TierQuota {
            max_documents: 3,
            max_conversations_per_month: 100,
            max_chatbots: 1,
        },
        SubscriptionTier::Basic => TierQuota {
            max_documents: 20,
            max_conversations_per_month: 1_000,
            max_chatbots: 1,
        },
        SubscriptionTier::Pro => TierQuota {
            max_documents: 100,
            max_conversations_per_month: 5_000,
            max_chatbots: 3,
        },
        SubscriptionTier::Ultra => TierQuota {
            max_documents: 500,
            max_conversations_per_month: 20_000,
            max_chatbots: 10,
        },
        SubscriptionTier::Enterprise => TierQuota {
            max_documents: 0,
            max_conversations_per_month: 0,
            max_chatbots: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_superset(upper: &[Feature], lower: &[Feature]) -> bool {
        lower.iter().all(|f| upper.contains(f))
    }

    #[test]
    fn test_features_grow_with_tier() {
        for pair in SubscriptionTier::ALL.windows(2) {
            let (lower, upper) = (features_for(pair[0]), features_for(pair[1]));
            assert!(is_superset(upper, lower), "{} ⊄ {}", pair[0], pair[1]);
            assert!(upper.len() > lower.len());
            // lower list is a prefix of the upper one, so ordering is stable
            assert_eq!(&upper[..lower.len()], lower);
        }
    }

    #[test]
    fn test_no_duplicate_features() {
        for tier in SubscriptionTier::ALL {
            let features = features_for(tier);
            for (i, f) in features.iter().enumerate() {
                assert!(!features[i + 1..].contains(f), "{tier} repeats {f:?}");
            }
        }
    }

    #[test]
    fn test_feature_serialize() {
        assert_eq!(
            serde_json::to_string(&Feature::LeadDetection).unwrap(),
            "\"lead_detection\""
        );
    }

    #[test]
    fn test_quota_monotonic() {
        // 0 = unlimited, which ranks above every finite limit
        let rank = |v: u32| if v == 0 { u32::MAX } else { v };
        for pair in SubscriptionTier::ALL.windows(2) {
            let (lower, upper) = (quota_for(pair[0]), quota_for(pair[1]));
            assert!(rank(upper.max_documents) >= rank(lower.max_documents));
            assert!(
                rank(upper.max_conversations_per_month)
                    >= rank(lower.max_conversations_per_month)
            );
            assert!(rank(upper.max_chatbots) >= rank(lower.max_chatbots));
        }
    }
}

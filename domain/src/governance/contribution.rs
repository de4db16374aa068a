//! Layer contributions
//!
//! Every governance layer's opinion is captured as a [`LayerContribution`].
//! Each known layer has a fixed serialized shape; anything else is kept as
//! [`LayerContribution::Unknown`] so the audit trail never loses data.
//!
//! [`LayerContributions`] is the optional-per-layer view the synthesizer
//! reasons over. An absent layer means "no opinion", never a rejection.

use super::decisions::{
    CostGovernanceDecision, MemoryRecommendation, NodeGovernanceDecision, PolicyDecision,
};
use super::preflight::{PlaybookPreflightResult, PreflightStatus};
use crate::playbook::IntentRoutingDecision;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const INTENT_LAYER: &str = "intent";
pub const PLAYBOOK_LAYER: &str = "playbook";
pub const NODE_GOVERNANCE_LAYER: &str = "node_governance";
pub const COST_GOVERNANCE_LAYER: &str = "cost_governance";
pub const MEMORY_LAYER: &str = "memory";
pub const POLICY_LAYER: &str = "policy";

/// Names of the known layers, in synthesis order
pub const KNOWN_LAYERS: [&str; 6] = [
    INTENT_LAYER,
    PLAYBOOK_LAYER,
    NODE_GOVERNANCE_LAYER,
    COST_GOVERNANCE_LAYER,
    MEMORY_LAYER,
    POLICY_LAYER,
];

/// One layer's opinion, tagged by layer
#[derive(Debug, Clone, PartialEq)]
pub enum LayerContribution {
    Intent(IntentRoutingDecision),
    Preflight(PlaybookPreflightResult),
    NodeGovernance(NodeGovernanceDecision),
    CostGovernance(CostGovernanceDecision),
    Memory(MemoryRecommendation),
    Policy(PolicyDecision),
    /// A shape no typed variant recognizes
    Unknown {
        type_name: String,
        raw_fields: Map<String, Value>,
    },
}

impl LayerContribution {
    /// Layer name used as the key in decision log entries
    pub fn layer_name(&self) -> &str {
        match self {
            LayerContribution::Intent(_) => INTENT_LAYER,
            LayerContribution::Preflight(_) => PLAYBOOK_LAYER,
            LayerContribution::NodeGovernance(_) => NODE_GOVERNANCE_LAYER,
            LayerContribution::CostGovernance(_) => COST_GOVERNANCE_LAYER,
            LayerContribution::Memory(_) => MEMORY_LAYER,
            LayerContribution::Policy(_) => POLICY_LAYER,
            LayerContribution::Unknown { type_name, .. } => type_name,
        }
    }

    /// Serialize to JSON. Never fails: a typed value that cannot be encoded
    /// degrades to a generic field dump.
    pub fn serialize(&self) -> Value {
        match self {
            LayerContribution::Intent(v) => typed_or_dump(INTENT_LAYER, v),
            LayerContribution::Preflight(v) => typed_or_dump(PLAYBOOK_LAYER, v),
            LayerContribution::NodeGovernance(v) => typed_or_dump(NODE_GOVERNANCE_LAYER, v),
            LayerContribution::CostGovernance(v) => typed_or_dump(COST_GOVERNANCE_LAYER, v),
            LayerContribution::Memory(v) => typed_or_dump(MEMORY_LAYER, v),
            LayerContribution::Policy(v) => typed_or_dump(POLICY_LAYER, v),
            LayerContribution::Unknown {
                type_name,
                raw_fields,
            } => serde_json::json!({
                "type_name": type_name,
                "fields": raw_fields,
            }),
        }
    }

    /// Rebuild a contribution from a stored layer output.
    ///
    /// `null` means the layer had no opinion and yields `None`. A known layer
    /// whose payload no longer matches its typed shape becomes `Unknown`.
    pub fn from_raw(layer_name: &str, value: Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }

        let parsed = match layer_name {
            INTENT_LAYER => serde_json::from_value(value.clone()).map(Self::Intent),
            PLAYBOOK_LAYER => serde_json::from_value(value.clone()).map(Self::Preflight),
            NODE_GOVERNANCE_LAYER => {
                serde_json::from_value(value.clone()).map(Self::NodeGovernance)
            }
            COST_GOVERNANCE_LAYER => {
                serde_json::from_value(value.clone()).map(Self::CostGovernance)
            }
            MEMORY_LAYER => serde_json::from_value(value.clone()).map(Self::Memory),
            POLICY_LAYER => serde_json::from_value(value.clone()).map(Self::Policy),
            _ => return Some(Self::unknown(layer_name, value)),
        };

        Some(parsed.unwrap_or_else(|_| Self::unknown(layer_name, value)))
    }

    /// Wrap an arbitrary value; non-object values land under `"value"`.
    pub fn unknown(type_name: impl Into<String>, value: Value) -> Self {
        let raw_fields = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        LayerContribution::Unknown {
            type_name: type_name.into(),
            raw_fields,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, LayerContribution::Unknown { .. })
    }
}

fn typed_or_dump<T: Serialize + std::fmt::Debug>(layer: &str, value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        serde_json::json!({
            "type_name": layer,
            "fields": { "debug": format!("{:?}", value) },
            "serialization_error": err.to_string(),
        })
    })
}

/// Optional opinions of every non-intent layer for one decision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerContributions {
    pub preflight: Option<PlaybookPreflightResult>,
    pub node_governance: Option<NodeGovernanceDecision>,
    pub cost_governance: Option<CostGovernanceDecision>,
    pub memory: Option<MemoryRecommendation>,
    pub policy: Option<PolicyDecision>,
}

impl LayerContributions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preflight(mut self, preflight: PlaybookPreflightResult) -> Self {
        self.preflight = Some(preflight);
        self
    }

    pub fn with_node_governance(mut self, decision: NodeGovernanceDecision) -> Self {
        self.node_governance = Some(decision);
        self
    }

    pub fn with_cost_governance(mut self, decision: CostGovernanceDecision) -> Self {
        self.cost_governance = Some(decision);
        self
    }

    pub fn with_memory(mut self, recommendation: MemoryRecommendation) -> Self {
        self.memory = Some(recommendation);
        self
    }

    pub fn with_policy(mut self, decision: PolicyDecision) -> Self {
        self.policy = Some(decision);
        self
    }

    pub fn preflight_status(&self) -> Option<PreflightStatus> {
        self.preflight.as_ref().map(|p| p.status)
    }

    pub fn preflight_rejected(&self) -> bool {
        self.preflight_status() == Some(PreflightStatus::Reject)
    }

    pub fn needs_clarification(&self) -> bool {
        self.preflight_status() == Some(PreflightStatus::NeedClarification)
    }

    pub fn node_rejected(&self) -> bool {
        self.node_governance.as_ref().is_some_and(|d| !d.approved)
    }

    pub fn cost_rejected(&self) -> bool {
        self.cost_governance.as_ref().is_some_and(|d| !d.approved)
    }

    pub fn policy_rejected(&self) -> bool {
        self.policy.as_ref().is_some_and(|d| !d.approved)
    }

    /// Fold one contribution into the set. Intent and unknown contributions
    /// are not part of this view and are returned back to the caller.
    pub fn absorb(&mut self, contribution: LayerContribution) -> Option<LayerContribution> {
        match contribution {
            LayerContribution::Preflight(v) => self.preflight = Some(v),
            LayerContribution::NodeGovernance(v) => self.node_governance = Some(v),
            LayerContribution::CostGovernance(v) => self.cost_governance = Some(v),
            LayerContribution::Memory(v) => self.memory = Some(v),
            LayerContribution::Policy(v) => self.policy = Some(v),
            other => return Some(other),
        }
        None
    }

    /// Serialize every known layer, absent layers as `null`
    pub fn to_layer_outputs(&self, intent: &IntentRoutingDecision) -> BTreeMap<String, Value> {
        let entries: [(&str, Option<LayerContribution>); 6] = [
            (INTENT_LAYER, Some(LayerContribution::Intent(intent.clone()))),
            (
                PLAYBOOK_LAYER,
                self.preflight.clone().map(LayerContribution::Preflight),
            ),
            (
                NODE_GOVERNANCE_LAYER,
                self.node_governance
                    .clone()
                    .map(LayerContribution::NodeGovernance),
            ),
            (
                COST_GOVERNANCE_LAYER,
                self.cost_governance
                    .clone()
                    .map(LayerContribution::CostGovernance),
            ),
            (MEMORY_LAYER, self.memory.clone().map(LayerContribution::Memory)),
            (POLICY_LAYER, self.policy.clone().map(LayerContribution::Policy)),
        ];

        entries
            .into_iter()
            .map(|(name, contribution)| {
                let value = contribution
                    .map(|c| c.serialize())
                    .unwrap_or(Value::Null);
                (name.to_string(), value)
            })
            .collect()
    }
}

//! The fixed tool menu offered to the model.

use super::catalog::{ParamDef, ParamType, ToolBackend, ToolCatalog, ToolEntry};

pub const GET_GOVERNANCE_METRICS: &str = "get_governance_metrics";
pub const GOVERNANCE_TOTAL_LOCKED_E8S: &str = "governance_total_locked_e8s";
pub const GET_ICP_USD_RATE: &str = "get_icp_usd_rate";
pub const GET_GOVERNANCE_NEURONS_TOTAL: &str = "get_governance_neurons_total";
pub const GET_GOVERNANCE_VOTING_POWER_TOTAL: &str = "get_governance_voting_power_total";
pub const GET_IC_PROPOSALS: &str = "get_ic_proposals";
pub const GET_IC_PROPOSALS_COUNT: &str = "get_ic_proposals_count";
pub const GET_IC_LATEST_PROPOSAL_ID: &str = "get_ic_latest_proposal_id";
pub const GET_IC_PROPOSALS_OVER_PAST_7D: &str = "get_ic_proposals_over_past_7d";
pub const GET_IC_PROPOSAL_INFO: &str = "get_ic_proposal_info";

pub const ADD_PROPOSAL_ID: &str = "add_proposal_id";
pub const REMOVE_PROPOSAL_ID: &str = "remove_proposal_id";
pub const GET_PROPOSAL_IDS: &str = "get_proposal_ids";
pub const GET_USER_PREFERENCES: &str = "get_user_preferences";
pub const SET_USER_PREFERENCES: &str = "set_user_preferences";

const REWARD_STATUSES: &[&str] = &[
    "UNSPECIFIED",
    "ACCEPT_VOTES",
    "READY_TO_SETTLE",
    "SETTLED",
    "INELIGIBLE",
];

const TOPICS: &[&str] = &[
    "TOPIC_UNSPECIFIED",
    "TOPIC_NEURON_MANAGEMENT",
    "TOPIC_EXCHANGE_RATE",
    "TOPIC_NETWORK_ECONOMICS",
    "TOPIC_GOVERNANCE",
    "TOPIC_NODE_ADMIN",
    "TOPIC_PARTICIPANT_MANAGEMENT",
    "TOPIC_SUBNET_MANAGEMENT",
    "TOPIC_NETWORK_CANISTER_MANAGEMENT",
    "TOPIC_KYC",
    "TOPIC_NODE_PROVIDER_REWARDS",
    "TOPIC_SNS_DECENTRALIZATION_SALE",
    "TOPIC_IC_OS_VERSION_DEPLOYMENT",
    "TOPIC_IC_OS_VERSION_ELECTION",
    "TOPIC_SNS_AND_COMMUNITY_FUND",
    "TOPIC_API_BOUNDARY_NODE_MANAGEMENT",
    "TOPIC_SUBNET_RENTAL",
    "TOPIC_PROTOCOL_CANISTER_MANAGEMENT",
    "TOPIC_SERVICE_NERVOUS_SYSTEM_MANAGEMENT",
    "TOPIC_SYSTEM_CANISTER_MANAGEMENT",
    "TOPIC_APPLICATION_CANISTER_MANAGEMENT",
];

const STATUSES: &[&str] = &[
    "UNKNOWN",
    "UNSPECIFIED",
    "OPEN",
    "REJECTED",
    "ADOPTED",
    "FAILED",
    "EXECUTED",
];

const ACTIONS: &[&str] = &[
    "ApproveGenesisKyc",
    "AddOrRemoveNodeProvider",
    "CreateServiceNervousSystem",
    "ExecuteNnsFunction",
    "FulfillSubnetRentalRequest",
    "InstallCode",
    "ManageNeuron",
    "ManageNetworkEconomics",
    "Motion",
    "OpenSnsTokenSwap",
    "RegisterKnownNeuron",
    "RewardNodeProvider",
    "RewardNodeProviders",
    "SetDefaultFollowees",
    "SetSnsTokenSwapOpenTimeWindow",
    "StopOrStartCanister",
    "UpdateCanisterSettings",
];

fn enum_list(values: &[&str]) -> ParamType {
    ParamType::EnumList(values.iter().map(|v| v.to_string()).collect())
}

fn proposal_id_param() -> ParamDef {
    ParamDef::required("proposal_id", ParamType::integer())
}

fn statistics(name: &str, description: &str) -> ToolEntry {
    ToolEntry::new(name, description, ToolBackend::Statistics)
}

fn canister(name: &str, description: &str) -> ToolEntry {
    ToolEntry::new(name, description, ToolBackend::Canister)
}

fn proposals_entry() -> ToolEntry {
    statistics(
        GET_IC_PROPOSALS,
        "List NNS proposals with optional filters (topic, status, action, etc.) and pagination.",
    )
    .param(
        ParamDef::optional(
            "offset",
            ParamType::Integer {
                minimum: Some(0),
                maximum: None,
            },
        )
        .with_description("Pagination offset (default 0)"),
    )
    .param(
        ParamDef::optional(
            "limit",
            ParamType::Integer {
                minimum: Some(50),
                maximum: Some(100),
            },
        )
        .with_description("Items per page (default 50)"),
    )
    .param(
        ParamDef::optional("max_proposal_index", ParamType::integer())
            .with_description("Return proposals with index <= this value (page backwards)"),
    )
    .param(ParamDef::optional("include_reward_status", enum_list(REWARD_STATUSES)))
    .param(ParamDef::optional("include_topic", enum_list(TOPICS)))
    .param(ParamDef::optional("include_status", enum_list(STATUSES)))
    .param(ParamDef::optional("include_action", enum_list(ACTIONS)))
    .param(
        ParamDef::optional("include_action_nns_function", ParamType::StringList)
            .with_description("NNS function names to include (use values shown by the API UI)."),
    )
    .param(ParamDef::optional("manage_neuron_id", ParamType::integer()))
    .param(ParamDef::optional("proposer", ParamType::integer()))
}

/// Every tool the agent exposes, statistics tools first.
pub fn governance_tools() -> Vec<ToolEntry> {
    vec![
        statistics(
            GET_GOVERNANCE_METRICS,
            "Fetch Internet Computer governance metrics from ic-api.internetcomputer.org (no parameters).",
        ),
        statistics(
            GOVERNANCE_TOTAL_LOCKED_E8S,
            "Gets the total amount of e8s locked in ICP governance.",
        ),
        statistics(
            GET_ICP_USD_RATE,
            "Fetch the latest ICP/USD rate from Internet Computer API.",
        ),
        statistics(
            GET_GOVERNANCE_NEURONS_TOTAL,
            "Fetch time-series of total governance neurons from Internet Computer API.",
        ),
        statistics(
            GET_GOVERNANCE_VOTING_POWER_TOTAL,
            "Fetch time-series of total governance voting power from the Internet Computer API.",
        ),
        proposals_entry(),
        statistics(
            GET_IC_PROPOSALS_COUNT,
            "Get the total number of Internet Computer governance proposals.",
        ),
        statistics(
            GET_IC_LATEST_PROPOSAL_ID,
            "Get the latest Internet Computer governance proposal ID. This is useful for fetching the most recent proposal details.",
        ),
        statistics(
            GET_IC_PROPOSALS_OVER_PAST_7D,
            "Get the number of IC governance proposals over the past 7 days and the delta vs the previous 7 days.",
        ),
        statistics(
            GET_IC_PROPOSAL_INFO,
            "Get details of a specific ICP governance proposal by ID.",
        )
        .param(proposal_id_param()),
        canister(ADD_PROPOSAL_ID, "Store a proposal ID in the user's list").param(proposal_id_param()),
        canister(REMOVE_PROPOSAL_ID, "Remove a proposal ID from the user's list")
            .param(proposal_id_param()),
        canister(
            GET_PROPOSAL_IDS,
            "Get the current list of proposal IDs stored by the user",
        ),
        canister(
            GET_USER_PREFERENCES,
            "Get the user's stored governance preferences (free text), if any",
        ),
        canister(
            SET_USER_PREFERENCES,
            "Store the user's governance preferences, replacing any previous value",
        )
        .param(
            ParamDef::required("preferences", ParamType::String)
                .with_description("Free-form preferences, e.g. topics the user follows"),
        ),
    ]
}

impl ToolCatalog {
    /// Catalog holding the full governance tool menu.
    pub fn governance() -> Self {
        let mut catalog = ToolCatalog::new();
        for entry in governance_tools() {
            // Names above are distinct constants, so registration cannot collide.
            if let Err(e) = catalog.register(entry) {
                tracing::error!("Skipping tool: {}", e);
            }
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_menu_size_and_split() {
        let catalog = ToolCatalog::governance();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog.names_for(ToolBackend::Statistics).len(), 10);
        assert_eq!(
            catalog.names_for(ToolBackend::Canister),
            vec![
                ADD_PROPOSAL_ID,
                REMOVE_PROPOSAL_ID,
                GET_PROPOSAL_IDS,
                GET_USER_PREFERENCES,
                SET_USER_PREFERENCES,
            ]
        );
    }

    #[test]
    fn test_every_spec_is_strict_and_closed() {
        for spec in ToolCatalog::governance().to_function_specs() {
            assert_eq!(spec["type"], "function");
            assert_eq!(spec["function"]["strict"], true);
            assert_eq!(spec["function"]["parameters"]["additionalProperties"], false);
        }
    }

    #[test]
    fn test_proposals_schema_enums() {
        let catalog = ToolCatalog::governance();
        let schema = catalog.get(GET_IC_PROPOSALS).unwrap().parameters_schema();
        let topics = schema["properties"]["include_topic"]["items"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(topics.len(), TOPICS.len());
        assert_eq!(schema["properties"]["offset"]["minimum"], 0);
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn test_proposal_id_tools_require_id() {
        let catalog = ToolCatalog::governance();
        for name in [GET_IC_PROPOSAL_INFO, ADD_PROPOSAL_ID, REMOVE_PROPOSAL_ID] {
            let errors = catalog.validate_args(name, &json!({})).unwrap();
            assert_eq!(errors, vec!["Missing required parameter: proposal_id"], "{}", name);
        }
    }
}

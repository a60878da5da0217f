use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};
use cw2::ContractVersion;

use crate::settlement::{Instruction, Settlement};
use crate::state::{Auction, AuctionStatus};

#[cw_serde]
pub struct InstantiateMsg {
    /// Defaults to the instantiating account
    pub owner: Option<String>,
    /// Contract that carries out emitted settlement instructions
    pub settlement_executor: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// List an asset for sale; the sender becomes the seller
    CreateApp {
        auction_id: String,
        asset_id: u64,
        asset_amount: Uint128,
        start_amount: Uint128,
    },
    /// Open bidding (seller only), optionally closing to bids after `duration` seconds
    StartAuction {
        auction_id: String,
        duration: Option<u64>,
    },
    /// Outbid the current high bid
    PlaceBid {
        auction_id: String,
        amount: Uint128,
    },
    /// Close the auction and emit its settlement
    EndAuction { auction_id: String },
    /// Update config (owner only)
    UpdateConfig {
        owner: Option<String>,
        settlement_executor: Option<String>,
        #[serde(default)]
        clear_executor: bool,
    },
}

/// Message sent to the configured settlement executor.
#[cw_serde]
pub enum SettlementExecutorMsg {
    ExecuteInstructions {
        auction_id: String,
        instructions: Vec<Instruction>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(ContractVersion)]
    ContractVersion {},
    /// Full record of a created auction
    #[returns(Auction)]
    Auction { auction_id: String },
    /// Lifecycle state, Pending for unknown slots
    #[returns(StateResponse)]
    State { auction_id: String },
    #[returns(HighBidResponse)]
    HighBid { auction_id: String },
    /// Settlement of an ended auction
    #[returns(SettlementResponse)]
    Settlement { auction_id: String },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: Addr,
    pub settlement_executor: Option<Addr>,
}

#[cw_serde]
pub struct StateResponse {
    pub state: AuctionStatus,
}

#[cw_serde]
pub struct HighBidResponse {
    pub high_bid: Uint128,
    pub high_bidder: Option<Addr>,
    pub minimum_next_bid: Uint128,
    pub expired: bool,
}

#[cw_serde]
pub struct SettlementResponse {
    pub settlement: Option<Settlement>,
}

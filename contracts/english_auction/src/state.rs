use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};
use cw_utils::Expiration;

use crate::error::ContractError;
use crate::settlement::Settlement;

#[cw_serde]
pub struct Config {
    pub owner: Addr,
    pub settlement_executor: Option<Addr>,
}

/// Lifecycle of a single auction slot. Transitions only move forward,
/// one step at a time.
#[cw_serde]
#[derive(Copy)]
pub enum AuctionStatus {
    Pending,
    Created,
    Started,
    Ended,
}

impl AuctionStatus {
    /// Status of a slot given its stored record; a slot without one is Pending.
    pub fn of(auction: Option<&Auction>) -> Self {
        auction.map(|a| a.state).unwrap_or(AuctionStatus::Pending)
    }
}

#[cw_serde]
pub struct Auction {
    pub id: String,
    pub seller: Addr,
    pub asset_id: u64,
    pub asset_amount: Uint128,
    pub start_amount: Uint128,
    pub high_bid: Uint128,
    pub high_bidder: Option<Addr>,
    pub state: AuctionStatus,
    pub expiration: Expiration,
    pub bid_count: u64,
    pub created_at: u64,
    pub started_at: Option<u64>,
    pub ended_at: Option<u64>,
}

impl Auction {
    /// Opens a new listing in the Created state. `current` is whatever the
    /// slot holds today; anything but Pending is rejected.
    pub fn create(
        current: Option<&Auction>,
        id: String,
        seller: Addr,
        asset_id: u64,
        asset_amount: Uint128,
        start_amount: Uint128,
        now: u64,
    ) -> Result<Auction, ContractError> {
        let state = AuctionStatus::of(current);
        if state != AuctionStatus::Pending {
            return Err(ContractError::InvalidTransition { state });
        }

        Ok(Auction {
            id,
            seller,
            asset_id,
            asset_amount,
            start_amount,
            high_bid: Uint128::zero(),
            high_bidder: None,
            state: AuctionStatus::Created,
            expiration: Expiration::Never {},
            bid_count: 0,
            created_at: now,
            started_at: None,
            ended_at: None,
        })
    }

    pub fn start(&mut self, expiration: Expiration, now: u64) -> Result<(), ContractError> {
        self.require(AuctionStatus::Created)?;
        self.state = AuctionStatus::Started;
        self.expiration = expiration;
        self.started_at = Some(now);
        Ok(())
    }

    /// Replaces the high bid. The amount must already have been checked
    /// with `accepts_bid`.
    pub fn record_bid(&mut self, bidder: Addr, amount: Uint128) -> Result<(), ContractError> {
        self.require(AuctionStatus::Started)?;
        self.high_bid = amount;
        self.high_bidder = Some(bidder);
        self.bid_count += 1;
        Ok(())
    }

    pub fn close(&mut self, now: u64) -> Result<(), ContractError> {
        self.require(AuctionStatus::Started)?;
        self.state = AuctionStatus::Ended;
        self.ended_at = Some(now);
        Ok(())
    }

    /// Smallest amount the next bid may carry: the start amount (never
    /// below one) for the opening bid, one above the high bid afterwards.
    pub fn minimum_bid(&self) -> Uint128 {
        match self.high_bidder {
            None => self.start_amount.max(Uint128::one()),
            Some(_) => self.high_bid.saturating_add(Uint128::one()),
        }
    }

    pub fn accepts_bid(&self, amount: Uint128) -> bool {
        match self.high_bidder {
            None => amount >= self.start_amount,
            Some(_) => amount > self.high_bid,
        }
    }

    pub fn is_seller(&self, addr: &Addr) -> bool {
        &self.seller == addr
    }

    fn require(&self, state: AuctionStatus) -> Result<(), ContractError> {
        if self.state != state {
            return Err(ContractError::InvalidTransition { state: self.state });
        }
        Ok(())
    }
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const AUCTIONS: Map<&str, Auction> = Map::new("auctions");
pub const SETTLEMENTS: Map<&str, Settlement> = Map::new("settlements");

use cosmwasm_std::{StdError, Uint128};
use cw_utils::PaymentError;
use thiserror::Error;

use crate::state::AuctionStatus;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Operation not permitted while auction is {state:?}")]
    InvalidTransition { state: AuctionStatus },

    #[error("Invalid auction parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("Bid too low, minimum accepted is {minimum}")]
    BidTooLow { minimum: Uint128 },

    #[error("Auction expired")]
    AuctionExpired {},
}

impl ContractError {
    pub fn invalid_parameters(reason: impl Into<String>) -> Self {
        ContractError::InvalidParameters {
            reason: reason.into(),
        }
    }
}

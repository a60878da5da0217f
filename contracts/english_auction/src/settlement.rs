use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Addr, Event, Response, StdResult, Uint128, WasmMsg};

use crate::msg::SettlementExecutorMsg;
use crate::state::{Auction, Config};

/// A transfer the settlement executor must carry out on behalf of an auction.
#[cw_serde]
pub enum Instruction {
    TransferAsset {
        to: Addr,
        asset_id: u64,
        asset_amount: Uint128,
    },
    TransferPayment {
        to: Addr,
        amount: Uint128,
    },
    Refund {
        to: Addr,
        amount: Uint128,
    },
}

impl Instruction {
    pub fn kind(&self) -> &'static str {
        match self {
            Instruction::TransferAsset { .. } => "transfer_asset",
            Instruction::TransferPayment { .. } => "transfer_payment",
            Instruction::Refund { .. } => "refund",
        }
    }

    pub fn to_event(&self, auction_id: &str) -> Event {
        let event = Event::new("settlement_instruction")
            .add_attribute("auction_id", auction_id)
            .add_attribute("kind", self.kind());

        match self {
            Instruction::TransferAsset {
                to,
                asset_id,
                asset_amount,
            } => event
                .add_attribute("to", to)
                .add_attribute("asset_id", asset_id.to_string())
                .add_attribute("asset_amount", asset_amount.to_string()),
            Instruction::TransferPayment { to, amount } | Instruction::Refund { to, amount } => {
                event.add_attribute("to", to).add_attribute("amount", amount.to_string())
            }
        }
    }
}

#[cw_serde]
pub struct AssetTransfer {
    pub to: Addr,
    pub asset_id: u64,
    pub asset_amount: Uint128,
}

#[cw_serde]
pub struct Payment {
    pub to: Addr,
    pub amount: Uint128,
}

/// Final transfers of an ended auction. Displaced bidders are refunded as
/// they are outbid, so `refunds` stays empty for a single high bid.
#[cw_serde]
pub struct Settlement {
    pub transfer_asset: AssetTransfer,
    pub transfer_payment: Option<Payment>,
    pub refunds: Vec<Payment>,
}

impl Settlement {
    pub fn compute(auction: &Auction) -> Self {
        match &auction.high_bidder {
            Some(winner) => Settlement {
                transfer_asset: AssetTransfer {
                    to: winner.clone(),
                    asset_id: auction.asset_id,
                    asset_amount: auction.asset_amount,
                },
                transfer_payment: Some(Payment {
                    to: auction.seller.clone(),
                    amount: auction.high_bid,
                }),
                refunds: vec![],
            },
            // No bids: the asset goes back to the seller.
            None => Settlement {
                transfer_asset: AssetTransfer {
                    to: auction.seller.clone(),
                    asset_id: auction.asset_id,
                    asset_amount: auction.asset_amount,
                },
                transfer_payment: None,
                refunds: vec![],
            },
        }
    }

    pub fn instructions(&self) -> Vec<Instruction> {
        let mut instructions = vec![Instruction::TransferAsset {
            to: self.transfer_asset.to.clone(),
            asset_id: self.transfer_asset.asset_id,
            asset_amount: self.transfer_asset.asset_amount,
        }];

        if let Some(payment) = &self.transfer_payment {
            instructions.push(Instruction::TransferPayment {
                to: payment.to.clone(),
                amount: payment.amount,
            });
        }

        instructions.extend(self.refunds.iter().map(|refund| Instruction::Refund {
            to: refund.to.clone(),
            amount: refund.amount,
        }));

        instructions
    }
}

/// Refund owed to the current high bidder once a higher bid replaces theirs.
pub fn displaced_refund(auction: &Auction) -> Option<Instruction> {
    auction.high_bidder.as_ref().map(|bidder| Instruction::Refund {
        to: bidder.clone(),
        amount: auction.high_bid,
    })
}

/// Reports `instructions` as events and, with an executor configured,
/// forwards them in a single message executed in the same transaction.
pub fn dispatch(
    response: Response,
    config: &Config,
    auction_id: &str,
    instructions: Vec<Instruction>,
) -> StdResult<Response> {
    if instructions.is_empty() {
        return Ok(response);
    }

    let response = response.add_events(
        instructions
            .iter()
            .map(|instruction| instruction.to_event(auction_id)),
    );

    match &config.settlement_executor {
        Some(executor) => Ok(response.add_message(WasmMsg::Execute {
            contract_addr: executor.to_string(),
            msg: to_json_binary(&SettlementExecutorMsg::ExecuteInstructions {
                auction_id: auction_id.to_string(),
                instructions,
            })?,
            funds: vec![],
        })),
        None => Ok(response),
    }
}

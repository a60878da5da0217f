#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Timestamp,
    Uint128,
};
use cw2::{get_contract_version, set_contract_version};
use cw_utils::{nonpayable, Expiration};

use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, ExecuteMsg, HighBidResponse, InstantiateMsg, QueryMsg, SettlementResponse,
    StateResponse,
};
use crate::settlement::{self, Settlement};
use crate::state::{Auction, AuctionStatus, Config, AUCTIONS, CONFIG, SETTLEMENTS};

// version info for migration info
const CONTRACT_NAME: &str = "crates.io:english_auction";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let owner = match msg.owner {
        Some(owner) => deps.api.addr_validate(&owner)?,
        None => info.sender,
    };
    let settlement_executor = msg
        .settlement_executor
        .map(|e| deps.api.addr_validate(&e))
        .transpose()?;

    let config = Config {
        owner: owner.clone(),
        settlement_executor,
    };

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("owner", owner)
        .add_attribute(
            "settlement_executor",
            config
                .settlement_executor
                .map(String::from)
                .unwrap_or_else(|| "none".to_string()),
        ))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;

    match msg {
        ExecuteMsg::CreateApp {
            auction_id,
            asset_id,
            asset_amount,
            start_amount,
        } => execute_create_app(
            deps,
            env,
            info,
            auction_id,
            asset_id,
            asset_amount,
            start_amount,
        ),
        ExecuteMsg::StartAuction {
            auction_id,
            duration,
        } => execute_start_auction(deps, env, info, auction_id, duration),
        ExecuteMsg::PlaceBid { auction_id, amount } => {
            execute_place_bid(deps, env, info, auction_id, amount)
        }
        ExecuteMsg::EndAuction { auction_id } => execute_end_auction(deps, env, info, auction_id),
        ExecuteMsg::UpdateConfig {
            owner,
            settlement_executor,
            clear_executor,
        } => execute_update_config(deps, info, owner, settlement_executor, clear_executor),
    }
}

pub fn execute_create_app(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    auction_id: String,
    asset_id: u64,
    asset_amount: Uint128,
    start_amount: Uint128,
) -> Result<Response, ContractError> {
    if auction_id.is_empty() {
        return Err(ContractError::invalid_parameters("auction id must not be empty"));
    }
    if asset_id == 0 {
        return Err(ContractError::invalid_parameters("asset id must be positive"));
    }
    if asset_amount.is_zero() {
        return Err(ContractError::invalid_parameters(
            "asset amount must be positive",
        ));
    }

    let current = AUCTIONS.may_load(deps.storage, &auction_id)?;
    let auction = Auction::create(
        current.as_ref(),
        auction_id.clone(),
        info.sender.clone(),
        asset_id,
        asset_amount,
        start_amount,
        env.block.time.seconds(),
    )?;

    AUCTIONS.save(deps.storage, &auction_id, &auction)?;

    Ok(Response::new()
        .add_attribute("method", "create_app")
        .add_attribute("auction_id", auction_id)
        .add_attribute("seller", info.sender)
        .add_attribute("asset_id", asset_id.to_string())
        .add_attribute("asset_amount", asset_amount)
        .add_attribute("start_amount", start_amount))
}

pub fn execute_start_auction(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    auction_id: String,
    duration: Option<u64>,
) -> Result<Response, ContractError> {
    let mut auction = load_auction(deps.as_ref(), &auction_id)?;

    if auction.state != AuctionStatus::Created {
        return Err(ContractError::InvalidTransition {
            state: auction.state,
        });
    }

    if !auction.is_seller(&info.sender) {
        return Err(ContractError::Unauthorized {});
    }

    let expiration = match duration {
        Some(seconds) => Expiration::AtTime(expiry_after(&env, seconds)?),
        None => Expiration::Never {},
    };

    auction.start(expiration, env.block.time.seconds())?;
    AUCTIONS.save(deps.storage, &auction_id, &auction)?;

    Ok(Response::new()
        .add_attribute("method", "start_auction")
        .add_attribute("auction_id", auction_id)
        .add_attribute("expiration", expiration.to_string()))
}

pub fn execute_place_bid(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    auction_id: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::invalid_parameters("bid must be positive"));
    }

    let config = CONFIG.load(deps.storage)?;
    let mut auction = load_auction(deps.as_ref(), &auction_id)?;

    if auction.state != AuctionStatus::Started {
        return Err(ContractError::InvalidTransition {
            state: auction.state,
        });
    }

    if auction.expiration.is_expired(&env.block) {
        return Err(ContractError::AuctionExpired {});
    }

    if auction.is_seller(&info.sender) {
        return Err(ContractError::Unauthorized {});
    }

    if !auction.accepts_bid(amount) {
        return Err(ContractError::BidTooLow {
            minimum: auction.minimum_bid(),
        });
    }

    // The displaced bidder's refund is emitted before the new bid is recorded.
    let refund = settlement::displaced_refund(&auction);
    auction.record_bid(info.sender.clone(), amount)?;
    AUCTIONS.save(deps.storage, &auction_id, &auction)?;

    let response = Response::new()
        .add_attribute("method", "place_bid")
        .add_attribute("auction_id", &auction_id)
        .add_attribute("bidder", info.sender)
        .add_attribute("amount", amount)
        .add_attribute("bid_count", auction.bid_count.to_string());

    Ok(settlement::dispatch(
        response,
        &config,
        &auction_id,
        refund.into_iter().collect(),
    )?)
}

pub fn execute_end_auction(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    auction_id: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut auction = load_auction(deps.as_ref(), &auction_id)?;

    if auction.state != AuctionStatus::Started {
        return Err(ContractError::InvalidTransition {
            state: auction.state,
        });
    }

    let expired = auction.expiration.is_expired(&env.block);
    if !auction.is_seller(&info.sender) && !expired {
        return Err(ContractError::Unauthorized {});
    }

    let settlement = Settlement::compute(&auction);
    auction.close(env.block.time.seconds())?;
    AUCTIONS.save(deps.storage, &auction_id, &auction)?;
    SETTLEMENTS.save(deps.storage, &auction_id, &settlement)?;

    let response = Response::new()
        .set_data(to_json_binary(&settlement)?)
        .add_attribute("method", "end_auction")
        .add_attribute("auction_id", &auction_id)
        .add_attribute("closed_by", info.sender)
        .add_attribute("expired", expired.to_string())
        .add_attribute("winner", settlement.transfer_asset.to.as_str())
        .add_attribute("winning_bid", auction.high_bid);

    Ok(settlement::dispatch(
        response,
        &config,
        &auction_id,
        settlement.instructions(),
    )?)
}

pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    owner: Option<String>,
    settlement_executor: Option<String>,
    clear_executor: bool,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.owner {
        return Err(ContractError::Unauthorized {});
    }

    if clear_executor && settlement_executor.is_some() {
        return Err(ContractError::invalid_parameters(
            "cannot set and clear the settlement executor at once",
        ));
    }

    if let Some(owner) = owner {
        config.owner = deps.api.addr_validate(&owner)?;
    }

    if let Some(executor) = settlement_executor {
        config.settlement_executor = Some(deps.api.addr_validate(&executor)?);
    } else if clear_executor {
        config.settlement_executor = None;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "update_config")
        .add_attribute("owner", config.owner))
}

fn expiry_after(env: &Env, seconds: u64) -> Result<Timestamp, ContractError> {
    if seconds == 0 {
        return Err(ContractError::invalid_parameters("duration must be positive"));
    }
    seconds
        .checked_mul(1_000_000_000)
        .and_then(|nanos| env.block.time.nanos().checked_add(nanos))
        .map(Timestamp::from_nanos)
        .ok_or_else(|| ContractError::invalid_parameters("duration out of range"))
}

fn load_auction(deps: Deps, auction_id: &str) -> Result<Auction, ContractError> {
    AUCTIONS
        .may_load(deps.storage, auction_id)?
        .ok_or(ContractError::InvalidTransition {
            state: AuctionStatus::Pending,
        })
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::ContractVersion {} => to_json_binary(&get_contract_version(deps.storage)?),
        QueryMsg::Auction { auction_id } => {
            to_json_binary(&AUCTIONS.load(deps.storage, &auction_id)?)
        }
        QueryMsg::State { auction_id } => to_json_binary(&query_state(deps, auction_id)?),
        QueryMsg::HighBid { auction_id } => {
            to_json_binary(&query_high_bid(deps, env, auction_id)?)
        }
        QueryMsg::Settlement { auction_id } => to_json_binary(&SettlementResponse {
            settlement: SETTLEMENTS.may_load(deps.storage, &auction_id)?,
        }),
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner,
        settlement_executor: config.settlement_executor,
    })
}

fn query_state(deps: Deps, auction_id: String) -> StdResult<StateResponse> {
    let auction = AUCTIONS.may_load(deps.storage, &auction_id)?;
    Ok(StateResponse {
        state: AuctionStatus::of(auction.as_ref()),
    })
}

fn query_high_bid(deps: Deps, env: Env, auction_id: String) -> StdResult<HighBidResponse> {
    let auction = AUCTIONS.load(deps.storage, &auction_id)?;
    Ok(HighBidResponse {
        high_bid: auction.high_bid,
        minimum_next_bid: auction.minimum_bid(),
        high_bidder: auction.high_bidder,
        expired: auction.expiration.is_expired(&env.block),
    })
}

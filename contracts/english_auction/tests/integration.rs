use anyhow::Result as AnyResult;
use cosmwasm_std::{Addr, Uint128};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};

use english_auction::msg::{
    ExecuteMsg, HighBidResponse, InstantiateMsg, QueryMsg, SettlementExecutorMsg,
    SettlementResponse, StateResponse,
};
use english_auction::settlement::Instruction;
use english_auction::state::{Auction, AuctionStatus};
use english_auction::ContractError;

mod executor {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdError, StdResult,
    };
    use cw_storage_plus::Item;

    use english_auction::msg::SettlementExecutorMsg;

    #[cw_serde]
    pub struct InstantiateMsg {
        pub fail: bool,
    }

    #[cw_serde]
    pub enum QueryMsg {
        Received {},
    }

    const FAIL: Item<bool> = Item::new("fail");
    const RECEIVED: Item<Vec<SettlementExecutorMsg>> = Item::new("received");

    pub fn instantiate(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: InstantiateMsg,
    ) -> StdResult<Response> {
        FAIL.save(deps.storage, &msg.fail)?;
        RECEIVED.save(deps.storage, &vec![])?;
        Ok(Response::new())
    }

    pub fn execute(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: SettlementExecutorMsg,
    ) -> StdResult<Response> {
        if FAIL.load(deps.storage)? {
            return Err(StdError::generic_err("transfer rejected"));
        }
        RECEIVED.update(deps.storage, |mut received| -> StdResult<_> {
            received.push(msg);
            Ok(received)
        })?;
        Ok(Response::new())
    }

    pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
        match msg {
            QueryMsg::Received {} => to_json_binary(&RECEIVED.load(deps.storage)?),
        }
    }
}

const OWNER: &str = "owner";
const SELLER: &str = "seller";
const ALICE: &str = "alice";
const BOB: &str = "bob";
const LOT: &str = "lot-1";

struct Suite {
    app: App,
    auction: Addr,
    executor: Addr,
}

impl Suite {
    fn new(failing_executor: bool) -> Self {
        let mut app = App::default();

        let executor_code = app.store_code(Box::new(ContractWrapper::new(
            executor::execute,
            executor::instantiate,
            executor::query,
        )));
        let executor = app
            .instantiate_contract(
                executor_code,
                Addr::unchecked(OWNER),
                &executor::InstantiateMsg {
                    fail: failing_executor,
                },
                &[],
                "settlement-executor",
                None,
            )
            .unwrap();

        let auction_code = app.store_code(Box::new(ContractWrapper::new(
            english_auction::contract::execute,
            english_auction::contract::instantiate,
            english_auction::contract::query,
        )));
        let auction = app
            .instantiate_contract(
                auction_code,
                Addr::unchecked(OWNER),
                &InstantiateMsg {
                    owner: None,
                    settlement_executor: Some(executor.to_string()),
                },
                &[],
                "english-auction",
                None,
            )
            .unwrap();

        Suite {
            app,
            auction,
            executor,
        }
    }

    fn execute(&mut self, sender: &str, msg: ExecuteMsg) -> AnyResult<AppResponse> {
        self.app
            .execute_contract(Addr::unchecked(sender), self.auction.clone(), &msg, &[])
    }

    fn create(&mut self, lot: &str) {
        self.execute(
            SELLER,
            ExecuteMsg::CreateApp {
                auction_id: lot.to_string(),
                asset_id: 10,
                asset_amount: Uint128::new(5),
                start_amount: Uint128::new(100),
            },
        )
        .unwrap();
    }

    fn start(&mut self, lot: &str) {
        self.execute(
            SELLER,
            ExecuteMsg::StartAuction {
                auction_id: lot.to_string(),
                duration: None,
            },
        )
        .unwrap();
    }

    fn bid(&mut self, bidder: &str, lot: &str, amount: u128) -> AnyResult<AppResponse> {
        self.execute(
            bidder,
            ExecuteMsg::PlaceBid {
                auction_id: lot.to_string(),
                amount: Uint128::new(amount),
            },
        )
    }

    fn end(&mut self, sender: &str, lot: &str) -> AnyResult<AppResponse> {
        self.execute(
            sender,
            ExecuteMsg::EndAuction {
                auction_id: lot.to_string(),
            },
        )
    }

    fn auction(&self, lot: &str) -> Auction {
        self.app
            .wrap()
            .query_wasm_smart(
                self.auction.clone(),
                &QueryMsg::Auction {
                    auction_id: lot.to_string(),
                },
            )
            .unwrap()
    }

    fn state(&self, lot: &str) -> AuctionStatus {
        let res: StateResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                self.auction.clone(),
                &QueryMsg::State {
                    auction_id: lot.to_string(),
                },
            )
            .unwrap();
        res.state
    }

    fn received(&self) -> Vec<SettlementExecutorMsg> {
        self.app
            .wrap()
            .query_wasm_smart(self.executor.clone(), &executor::QueryMsg::Received {})
            .unwrap()
    }
}

fn rejected(res: AnyResult<AppResponse>) -> ContractError {
    res.unwrap_err().downcast().unwrap()
}

#[test]
fn english_auction_settles_through_executor() {
    let mut suite = Suite::new(false);
    assert_eq!(suite.state(LOT), AuctionStatus::Pending);

    suite.create(LOT);
    suite.start(LOT);

    assert_eq!(
        rejected(suite.bid(ALICE, LOT, 99)),
        ContractError::BidTooLow {
            minimum: Uint128::new(100)
        }
    );
    suite.bid(ALICE, LOT, 100).unwrap();
    assert_eq!(
        rejected(suite.bid(BOB, LOT, 100)),
        ContractError::BidTooLow {
            minimum: Uint128::new(101)
        }
    );
    suite.bid(BOB, LOT, 150).unwrap();

    let high: HighBidResponse = suite
        .app
        .wrap()
        .query_wasm_smart(
            suite.auction.clone(),
            &QueryMsg::HighBid {
                auction_id: LOT.to_string(),
            },
        )
        .unwrap();
    assert_eq!(high.high_bid, Uint128::new(150));
    assert_eq!(high.high_bidder, Some(Addr::unchecked(BOB)));
    assert_eq!(high.minimum_next_bid, Uint128::new(151));
    assert!(!high.expired);

    suite.end(SELLER, LOT).unwrap();
    assert_eq!(suite.state(LOT), AuctionStatus::Ended);

    assert_eq!(
        suite.received(),
        vec![
            SettlementExecutorMsg::ExecuteInstructions {
                auction_id: LOT.to_string(),
                instructions: vec![Instruction::Refund {
                    to: Addr::unchecked(ALICE),
                    amount: Uint128::new(100),
                }],
            },
            SettlementExecutorMsg::ExecuteInstructions {
                auction_id: LOT.to_string(),
                instructions: vec![
                    Instruction::TransferAsset {
                        to: Addr::unchecked(BOB),
                        asset_id: 10,
                        asset_amount: Uint128::new(5),
                    },
                    Instruction::TransferPayment {
                        to: Addr::unchecked(SELLER),
                        amount: Uint128::new(150),
                    },
                ],
            },
        ]
    );

    // a second end never re-emits the settlement
    assert_eq!(
        rejected(suite.end(SELLER, LOT)),
        ContractError::InvalidTransition {
            state: AuctionStatus::Ended
        }
    );
    assert_eq!(suite.received().len(), 2);

    let stored: SettlementResponse = suite
        .app
        .wrap()
        .query_wasm_smart(
            suite.auction.clone(),
            &QueryMsg::Settlement {
                auction_id: LOT.to_string(),
            },
        )
        .unwrap();
    assert_eq!(
        stored.settlement.unwrap().transfer_asset.to,
        Addr::unchecked(BOB)
    );
}

#[test]
fn accepted_bids_strictly_increase() {
    let mut suite = Suite::new(false);
    suite.create(LOT);
    suite.start(LOT);

    let bids = [(ALICE, 100u128), (BOB, 120), (ALICE, 121), (BOB, 400)];
    let mut previous = Uint128::zero();
    for (bidder, amount) in bids {
        suite.bid(bidder, LOT, amount).unwrap();
        let auction = suite.auction(LOT);
        assert!(auction.high_bid > previous);
        assert_eq!(auction.high_bidder, Some(Addr::unchecked(bidder)));
        previous = auction.high_bid;
    }

    let auction = suite.auction(LOT);
    assert_eq!(auction.high_bid, Uint128::new(400));
    assert_eq!(auction.bid_count, 4);
    // one refund per displaced bid
    assert_eq!(suite.received().len(), 3);
}

#[test]
fn failed_settlement_reverts_the_bid() {
    let mut suite = Suite::new(true);
    suite.create(LOT);
    suite.start(LOT);

    // no one to refund yet, so nothing reaches the executor
    suite.bid(ALICE, LOT, 100).unwrap();

    assert!(suite.bid(BOB, LOT, 150).is_err());

    let auction = suite.auction(LOT);
    assert_eq!(auction.high_bid, Uint128::new(100));
    assert_eq!(auction.high_bidder, Some(Addr::unchecked(ALICE)));
    assert_eq!(auction.bid_count, 1);

    assert!(suite.end(SELLER, LOT).is_err());
    assert_eq!(suite.state(LOT), AuctionStatus::Started);
}

#[test]
fn auction_slots_are_independent() {
    let mut suite = Suite::new(false);
    suite.create("lot-a");
    suite.create("lot-b");
    suite.start("lot-a");

    suite.bid(ALICE, "lot-a", 100).unwrap();
    assert_eq!(
        rejected(suite.bid(ALICE, "lot-b", 100)),
        ContractError::InvalidTransition {
            state: AuctionStatus::Created
        }
    );

    suite.end(SELLER, "lot-a").unwrap();
    assert_eq!(suite.state("lot-a"), AuctionStatus::Ended);
    assert_eq!(suite.state("lot-b"), AuctionStatus::Created);
    assert_eq!(suite.state("lot-c"), AuctionStatus::Pending);
}

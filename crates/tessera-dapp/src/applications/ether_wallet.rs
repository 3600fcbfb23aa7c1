//! 以太钱包应用。
//!
//! ## 能力概览（What）
//! - **入金**：入口合约（portal）以紧凑布局下发 `address ++ uint256 ++ bytes`
//!   负载，路由按发送方门控，只认来自 portal 的 advance 输入；
//! - **取款**：以 `EtherWithdraw(uint256,bytes)` 选择子为头的 advance 输入，
//!   余额不足则拒绝，成功时发出纯转账 voucher；
//! - **查询**：URL inspect 路由 `balance/ether` 把余额账本以 JSON 形式 report。
//!
//! ## 实现策略（How）
//! - 钱包本身是一个组合路由：ABI 路由承载存取款，URL 路由承载查询，
//!   处理器闭包经 `Rc<RefCell<…>>` 共享余额账本（单线程同步模型）；
//! - 取款处理器解码的是头之后的参数字节；
//! - 可选的入金回调在记账完成后触发，回调失败只记日志不回滚。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tessera_codec_abi::{
    AbiHeader, EncodingMode, Field, FieldType, Schema, TypeTag, Word, decode_record,
    format_address,
};
use tessera_core::request::{RollupData, RollupRequest, encode_hex_payload};
use tessera_core::rollup::Rollup;
use tessera_core::router::{BoxError, HandlerOutcome, HandlerResult, RouteMatch, Router};
use tessera_router::{AbiRouteSpec, AbiRouter, MultiRouter, UrlRouter};

use super::ApplicationError;
use crate::vouchers::ether_withdrawal;

/// 一笔已入账的存款，供入金回调消费。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EtherDeposit {
    /// 存款人地址（小写）。
    pub sender: String,
    /// 入账金额（wei）。
    pub amount: u128,
    /// 随存款附带的执行层数据。
    pub exec_layer_data: Vec<u8>,
}

/// 入金回调签名。回调失败只记录日志，存款不回滚。
pub type DepositHook = Box<dyn Fn(&mut dyn Rollup, &RollupData, &EtherDeposit) -> Result<(), BoxError>>;

type Balances = Rc<RefCell<BTreeMap<String, u128>>>;

/// 以太钱包：portal 门控入金、选择子头取款、URL 余额查询。
pub struct EtherWallet {
    balances: Balances,
    on_deposit: Rc<RefCell<Option<DepositHook>>>,
    portal_address: String,
    router: MultiRouter,
}

fn deposit_schema() -> Schema {
    Schema::new(vec![
        Field::new("sender", FieldType::Value(TypeTag::Address)),
        Field::new("depositAmount", FieldType::Value(TypeTag::Uint(256))),
        Field::new("execLayerData", FieldType::Value(TypeTag::Bytes)),
    ])
}

fn withdraw_schema() -> Schema {
    Schema::new(vec![
        Field::new("amount", FieldType::Value(TypeTag::Uint(256))),
        Field::new("execLayerData", FieldType::Value(TypeTag::Bytes)),
    ])
}

impl EtherWallet {
    /// 装配钱包路由。`default_withdraw_route` 控制是否注册内置取款路由，
    /// 应用可关掉它并以自定义头另行注册。
    pub fn new(
        portal_address: &str,
        default_withdraw_route: bool,
    ) -> Result<Self, ApplicationError> {
        let balances: Balances = Rc::new(RefCell::new(BTreeMap::new()));
        let on_deposit: Rc<RefCell<Option<DepositHook>>> = Rc::new(RefCell::new(None));

        let mut abi_router = AbiRouter::with_namespace("wallet");

        let deposit_balances = Rc::clone(&balances);
        let deposit_hook = Rc::clone(&on_deposit);
        let schema = deposit_schema();
        abi_router.advance(
            AbiRouteSpec::new("deposit_ether")
                .msg_sender(portal_address)
                .summary("book an ether deposit from the portal"),
            move |rollup: &mut dyn Rollup, context: &tessera_router::AbiContext<'_>| -> HandlerResult {
                let record = decode_record(context.args(), &schema, EncodingMode::Packed)?;
                let sender = format_address(record.field("sender")?.as_address()?);
                let amount = record.field("depositAmount")?.as_u128()?;
                let exec_layer_data = record.field("execLayerData")?.as_bytes()?.to_vec();
                tracing::debug!(sender = %sender, amount, "booking ether deposit");
                {
                    let mut balances = deposit_balances.borrow_mut();
                    let entry = balances.entry(sender.clone()).or_insert(0);
                    *entry = entry.checked_add(amount).ok_or("ether balance overflow")?;
                }
                let deposit = EtherDeposit {
                    sender,
                    amount,
                    exec_layer_data,
                };
                if let Some(hook) = deposit_hook.borrow().as_ref()
                    && let Err(error) = hook(rollup, context.data(), &deposit)
                {
                    tracing::error!(error = %error, "deposit hook failed; deposit stays booked");
                }
                Ok(HandlerOutcome::Accept)
            },
        );

        if default_withdraw_route {
            let withdraw_header = AbiHeader::for_schema("EtherWithdraw", &withdraw_schema())?;
            let withdraw_balances = Rc::clone(&balances);
            let schema = withdraw_schema();
            abi_router.advance(
                AbiRouteSpec::new("withdraw_ether")
                    .header(withdraw_header)
                    .summary("withdraw ether back to the sender"),
                move |rollup: &mut dyn Rollup, context: &tessera_router::AbiContext<'_>| -> HandlerResult {
                    let record = decode_record(context.args(), &schema, EncodingMode::Packed)?;
                    let amount = record.field("amount")?.as_u128()?;
                    let Some(metadata) = context.data().metadata.as_ref() else {
                        return Err("withdrawal requires request metadata".into());
                    };
                    let address = metadata.msg_sender.to_lowercase();
                    let mut balances = withdraw_balances.borrow_mut();
                    let balance = balances.get(&address).copied().unwrap_or(0);
                    if balance < amount {
                        tracing::debug!(address = %address, amount, balance, "insufficient funds");
                        return Ok(HandlerOutcome::Reject);
                    }
                    balances.insert(address.clone(), balance - amount);
                    drop(balances);
                    rollup.voucher(&ether_withdrawal(&address, Word::from_u128(amount)))?;
                    Ok(HandlerOutcome::Accept)
                },
            );
        }

        let mut url_router = UrlRouter::new();
        let inspect_balances = Rc::clone(&balances);
        url_router.inspect(
            "balance/ether",
            "inspect_ether_balance",
            move |rollup: &mut dyn Rollup, _context: &tessera_router::UrlContext<'_>| -> HandlerResult {
                let balances = inspect_balances.borrow();
                let body = serde_json::to_string(&*balances)?;
                rollup.report(&encode_hex_payload(body.as_bytes()))?;
                Ok(HandlerOutcome::Accept)
            },
        )?;

        let mut router = MultiRouter::new();
        router.add_router(abi_router);
        router.add_router(url_router);

        Ok(Self {
            balances,
            on_deposit,
            portal_address: portal_address.to_string(),
            router,
        })
    }

    /// 查询某地址的余额（wei），地址大小写不敏感。
    pub fn balance_of(&self, address: &str) -> u128 {
        self.balances
            .borrow()
            .get(&address.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// 注册入金回调，后注册者覆盖先注册者。
    pub fn set_on_deposit(&self, hook: DepositHook) {
        *self.on_deposit.borrow_mut() = Some(hook);
    }

    /// 入金门控的 portal 地址。
    pub fn portal_address(&self) -> &str {
        &self.portal_address
    }
}

impl Router for EtherWallet {
    fn get_handler<'req>(&'req self, request: &'req RollupRequest) -> Option<RouteMatch<'req>> {
        self.router.get_handler(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dapp::Dapp;
    use crate::testkit::TestClient;
    use tessera_codec_abi::{Record, Value, encode_record};

    const PORTAL: &str = "0xFfdbe43d4c855BF7e0f105c400A50857f53AB044";
    const ALICE: &str = "0x721be000f6054b5e0e57aaab791015b53f0a18f4";

    fn deposit_payload(sender: &str, amount: u128, data: &[u8]) -> String {
        let record = Record::new(vec![
            (
                "sender".into(),
                Value::Address(tessera_codec_abi::parse_address(sender).expect("地址合法")),
            ),
            ("depositAmount".into(), Value::Uint(Word::from_u128(amount))),
            ("execLayerData".into(), Value::Bytes(data.to_vec())),
        ]);
        let bytes = encode_record(&deposit_schema(), &record, EncodingMode::Packed)
            .expect("存款负载应可编码");
        encode_hex_payload(&bytes)
    }

    fn withdraw_payload(amount: u128, data: &[u8]) -> String {
        let header = AbiHeader::for_schema("EtherWithdraw", &withdraw_schema())
            .expect("取款头应可派生");
        let record = Record::new(vec![
            ("amount".into(), Value::Uint(Word::from_u128(amount))),
            ("execLayerData".into(), Value::Bytes(data.to_vec())),
        ]);
        let mut bytes = header.to_bytes();
        bytes.extend(
            encode_record(&withdraw_schema(), &record, EncodingMode::Packed)
                .expect("取款负载应可编码"),
        );
        encode_hex_payload(&bytes)
    }

    fn client_with_wallet() -> (TestClient, Rc<RefCell<BTreeMap<String, u128>>>) {
        let wallet = EtherWallet::new(PORTAL, true).expect("钱包应可装配");
        let balances = Rc::clone(&wallet.balances);
        let mut dapp = Dapp::new();
        dapp.add_router(wallet);
        (TestClient::new(dapp), balances)
    }

    #[test]
    fn portal_deposit_books_the_balance() {
        let (mut client, balances) = client_with_wallet();
        let payload = deposit_payload(ALICE, 1_000_000_000_000_000_000, b"");
        assert!(client.send_advance_from(&payload, PORTAL, 0));
        assert_eq!(
            balances.borrow().get(ALICE).copied(),
            Some(1_000_000_000_000_000_000)
        );
    }

    #[test]
    fn deposit_from_non_portal_sender_is_rejected() {
        let (mut client, balances) = client_with_wallet();
        let payload = deposit_payload(ALICE, 5, b"");
        assert!(!client.send_advance_from(&payload, ALICE, 0));
        assert!(balances.borrow().is_empty());
    }

    #[test]
    fn withdrawal_emits_a_value_voucher() {
        let (mut client, _balances) = client_with_wallet();
        assert!(client.send_advance_from(&deposit_payload(ALICE, 100, b""), PORTAL, 0));

        assert!(client.send_advance_from(&withdraw_payload(40, b""), ALICE, 0));
        assert_eq!(client.rollup.vouchers.len(), 1);
        let voucher = &client.rollup.vouchers[0].voucher;
        assert_eq!(voucher.destination, ALICE);
        assert_eq!(voucher.value, Word::from_u128(40).to_string());
        assert_eq!(voucher.payload, "0x");
    }

    #[test]
    fn overdraft_is_rejected_without_a_voucher() {
        let (mut client, balances) = client_with_wallet();
        assert!(client.send_advance_from(&deposit_payload(ALICE, 10, b""), PORTAL, 0));
        assert!(!client.send_advance_from(&withdraw_payload(11, b""), ALICE, 0));
        assert!(client.rollup.vouchers.is_empty());
        assert_eq!(balances.borrow().get(ALICE).copied(), Some(10));
    }

    #[test]
    fn balance_inspect_reports_the_book_as_json() {
        let (mut client, _balances) = client_with_wallet();
        assert!(client.send_advance_from(&deposit_payload(ALICE, 7, b""), PORTAL, 0));

        let path = encode_hex_payload(b"balance/ether");
        assert!(client.send_inspect(&path));
        let report = client.rollup.reports.last().expect("应有 report");
        let body = tessera_core::request::decode_hex_payload(&report.payload).expect("负载合法");
        let book: BTreeMap<String, u128> =
            serde_json::from_slice(&body).expect("report 应为余额 JSON");
        assert_eq!(book.get(ALICE).copied(), Some(7));
    }

    #[test]
    fn wallet_handle_stays_usable_after_mounting() {
        // 经 Rc 挂载后，应用仍可直接查询余额。
        let wallet = Rc::new(EtherWallet::new(PORTAL, true).expect("钱包应可装配"));
        let mut dapp = Dapp::new();
        dapp.add_router(Rc::clone(&wallet));
        let mut client = TestClient::new(dapp);

        assert!(client.send_advance_from(&deposit_payload(ALICE, 12, b""), PORTAL, 0));
        assert_eq!(wallet.balance_of(ALICE), 12);
        assert_eq!(wallet.balance_of(&ALICE.to_uppercase().replacen("0X", "0x", 1)), 12);
        assert_eq!(wallet.portal_address(), PORTAL);
    }

    #[test]
    fn deposit_hook_failure_keeps_the_booking() {
        let wallet = EtherWallet::new(PORTAL, true).expect("钱包应可装配");
        wallet.set_on_deposit(Box::new(|_rollup, _data, _deposit| Err("hook down".into())));
        let balances = Rc::clone(&wallet.balances);
        let mut dapp = Dapp::new();
        dapp.add_router(wallet);
        let mut client = TestClient::new(dapp);

        assert!(client.send_advance_from(&deposit_payload(ALICE, 3, b""), PORTAL, 0));
        assert_eq!(balances.borrow().get(ALICE).copied(), Some(3));
    }
}

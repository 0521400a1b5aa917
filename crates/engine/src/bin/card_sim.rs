//! Drives one card from stdin and prints every view update as a JSON line.
//!
//! Commands:
//!   token <uid> <code> <decimals>   select asset
//!   price <uid> <price|none>        price feed tick
//!   balance <amount|none>           card balance
//!   estimate <amount|none>          quote sets an estimated amount
//!   error [message]                 balance error (no message clears it)
//!   type [text]                     user input
//!   percent <n>                     percent of balance
//!   toggle                          coin <-> currency
//!   valid <text>                    validate input
//!   quit

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use domain::types::{AmountDisplay, AmountType, CardError, Currency, InputParams, Token};
use engine::card::InMemoryCard;
use engine::config::EngineConfig;
use engine::price::InMemoryPriceFeed;
use engine::runtime::{CardHandle, spawn_card};
use engine::sink::CardView;
use fiat::format::{EnglishTranslator, PlainFormatter};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "USD")]
    currency_code: String,
    #[arg(long, default_value = "$")]
    currency_symbol: String,
    #[arg(long, default_value_t = 2)]
    currency_decimals: u32,

    /// coin decimals while no asset is selected
    #[arg(long, default_value_t = 8)]
    max_decimals: u32,
    #[arg(long, default_value_t = false)]
    reset_on_select: bool,
    #[arg(long, default_value_t = false)]
    currency_first: bool,
    #[arg(long, default_value_t = 2048)]
    channel_capacity: usize,
}

impl Args {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            currency: Currency::new(
                &self.currency_code,
                &self.currency_symbol,
                self.currency_decimals,
            ),
            default_max_decimals: self.max_decimals,
            reset_amount_on_select: self.reset_on_select,
            initial_amount_type: if self.currency_first {
                AmountType::Currency
            } else {
                AmountType::Coin
            },
            channel_capacity: self.channel_capacity,
        }
    }
}

#[derive(Debug)]
enum Command {
    Token(Token),
    Price(String, Option<Decimal>),
    Balance(Option<Decimal>),
    Estimate(Option<Decimal>),
    Error(Option<String>),
    Type(String),
    Percent(u32),
    Toggle,
    Valid(String),
    Quit,
}

#[derive(Serialize)]
#[serde(tag = "view", content = "value", rename_all = "snake_case")]
enum ViewUpdate {
    Amount(AmountDisplay),
    SecondaryInfo(Option<String>),
    Balance(Option<String>),
    BalanceError(bool),
    HasNonZeroBalance(Option<bool>),
    Token(Option<Token>),
    Estimated(bool),
    InputParams(InputParams),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "engine=info,card_sim=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config();
    info!(currency = %config.currency.code, "card_sim starting");

    let card = Arc::new(InMemoryCard::new());
    let feed = InMemoryPriceFeed::new();
    let handle = spawn_card(
        card.clone(),
        feed.subscribe(),
        config,
        Arc::new(PlainFormatter),
        Arc::new(EnglishTranslator),
    );

    let printer = tokio::spawn(print_view(handle.view().clone()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("stdin read failed")? {
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                warn!("bad command '{}': {}", line, e);
                continue;
            }
        };
        if !execute(cmd, &handle, &card, &feed).await? {
            break;
        }
    }

    handle.shutdown().await;
    printer.await.context("printer task failed")?;
    Ok(())
}

/// Returns `false` on quit.
async fn execute(
    cmd: Command,
    handle: &CardHandle,
    card: &InMemoryCard,
    feed: &InMemoryPriceFeed,
) -> Result<bool> {
    match cmd {
        Command::Token(token) => handle.select_token(token).await?,
        Command::Price(uid, price) => feed.set_price(&uid, price),
        Command::Balance(balance) => card.set_balance(balance),
        Command::Estimate(amount) => card.apply_estimate(amount),
        Command::Error(message) => card.set_error(message.map(CardError)),
        Command::Type(text) => handle.set_amount_text(text).await?,
        Command::Percent(p) => handle.set_percent_of_balance(p).await?,
        Command::Toggle => handle.toggle_unit().await?,
        Command::Valid(text) => {
            let valid = handle.is_valid_input(&text);
            println!("{}", serde_json::json!({ "valid": valid, "text": text }));
        }
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let mut parts = rest.split_whitespace();

    let cmd = match head {
        "token" => {
            let uid = parts.next().context("uid missing")?;
            let code = parts.next().context("code missing")?;
            let decimals = parts
                .next()
                .context("decimals missing")?
                .parse()
                .context("invalid decimals")?;
            Command::Token(Token::new(uid, code, decimals))
        }
        "price" => {
            let uid = parts.next().context("uid missing")?;
            let price = parse_opt_decimal(parts.next().context("price missing")?)?;
            Command::Price(uid.to_string(), price)
        }
        "balance" => Command::Balance(parse_opt_decimal(rest)?),
        "estimate" => Command::Estimate(parse_opt_decimal(rest)?),
        "error" => Command::Error((!rest.is_empty()).then(|| rest.to_string())),
        "type" => Command::Type(rest.to_string()),
        "percent" => Command::Percent(rest.parse().context("invalid percent")?),
        "toggle" => Command::Toggle,
        "valid" => Command::Valid(rest.to_string()),
        "quit" | "exit" => Command::Quit,
        _ => anyhow::bail!("unknown command: {}", head),
    };
    Ok(Some(cmd))
}

fn parse_opt_decimal(s: &str) -> Result<Option<Decimal>> {
    if s.is_empty() || s == "none" {
        return Ok(None);
    }
    let v = s
        .parse::<Decimal>()
        .with_context(|| format!("invalid decimal: {}", s))?;
    Ok(Some(v))
}

async fn print_view(mut view: CardView) {
    loop {
        let update = tokio::select! {
            r = view.amount.changed() => {
                if r.is_err() { break; }
                ViewUpdate::Amount(view.amount.borrow_and_update().clone())
            }
            r = view.secondary_info.changed() => {
                if r.is_err() { break; }
                ViewUpdate::SecondaryInfo(view.secondary_info.borrow_and_update().clone())
            }
            r = view.balance.changed() => {
                if r.is_err() { break; }
                ViewUpdate::Balance(view.balance.borrow_and_update().clone())
            }
            r = view.balance_error.changed() => {
                if r.is_err() { break; }
                ViewUpdate::BalanceError(*view.balance_error.borrow_and_update())
            }
            r = view.has_non_zero_balance.changed() => {
                if r.is_err() { break; }
                ViewUpdate::HasNonZeroBalance(*view.has_non_zero_balance.borrow_and_update())
            }
            r = view.token.changed() => {
                if r.is_err() { break; }
                ViewUpdate::Token(view.token.borrow_and_update().clone())
            }
            r = view.estimated.changed() => {
                if r.is_err() { break; }
                ViewUpdate::Estimated(*view.estimated.borrow_and_update())
            }
            r = view.input_params.changed() => {
                if r.is_err() { break; }
                ViewUpdate::InputParams(view.input_params.borrow_and_update().clone())
            }
        };

        match serde_json::to_string(&update) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("view update not serializable: {}", e),
        }
    }
}

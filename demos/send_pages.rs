// ABOUTME: Example application composing a message and dispatching it through a simulated gateway
// ABOUTME: Shows ComposeSession, balance gating, channel-based progress and history records

use argh::FromArgs;
use sms_dispatch::datatypes::{BalanceSnapshot, Recipient};
use sms_dispatch::dispatch::{
    BalanceSource, CancelHandle, ChannelProgress, ComposeSession, GatewayError, GatewayResult,
    SendMeta, SequencerBuilder, SmsGateway,
};
use sms_dispatch::history::{HistoryFilter, HistoryRecord, HistoryStore, MemoryHistory};
use sms_dispatch::{EngineConfig, Message};
use std::error::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Compose a message and send it through a simulated gateway
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debug logging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// path to a TOML engine configuration
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// the message to send
    #[argh(option, short = 'm')]
    message: String,

    /// a recipient telephone number (repeatable)
    #[argh(option, short = 't')]
    to: Vec<String>,

    /// send as MMS
    #[argh(switch)]
    mms: bool,

    /// simulated point balance (default: 1000)
    #[argh(option, short = 'b')]
    balance: Option<u64>,

    /// page number (1-based) the simulated gateway should reject
    #[argh(option)]
    fail_page: Option<usize>,
}

/// Gateway that prints each page instead of sending it
struct PrintingGateway {
    fail_page: Option<usize>,
}

impl SmsGateway for PrintingGateway {
    async fn send(&mut self, page_text: &str, recipients: &[Recipient], meta: &SendMeta) -> GatewayResult<String> {
        if self.fail_page == Some(meta.page_index + 1) {
            return Err(GatewayError::Rejected {
                code: "E403".to_string(),
                reason: "simulated rejection".to_string(),
            });
        }
        println!(
            "[{} {}/{}] -> {} recipient(s): {}",
            meta.class,
            meta.page_index + 1,
            meta.total_pages,
            recipients.len(),
            page_text.chars().take(30).collect::<String>()
        );
        Ok(format!("{}-{}", meta.job_tag, meta.page_index))
    }
}

struct SimulatedBalance(u64);

impl BalanceSource for SimulatedBalance {
    async fn fetch_balance(&self) -> GatewayResult<BalanceSnapshot> {
        Ok(BalanceSnapshot::new(self.0, 0))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let level = if cli_args.debugging {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = match &cli_args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut session = ComposeSession::from_config(&config);
    session.set_text(cli_args.message);
    session.set_mms(cli_args.mms);
    session.set_recipients(cli_args.to.into_iter().map(Recipient::new).collect());

    let classification = session.classification();
    println!(
        "{} bytes, {} page(s) as {}",
        classification.byte_length, classification.page_count, classification.class
    );

    let source = SimulatedBalance(cli_args.balance.unwrap_or(1000));
    session.refresh_balance(&source).await?;
    let quote = session.quote();
    println!(
        "Cost: {} point(s) x {} recipient(s) = {} point(s)",
        quote.per_recipient_points, quote.recipient_count, quote.total_points
    );
    if let Some(message) = session.verdict().and_then(|v| v.message) {
        println!("{message}");
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<sms_dispatch::dispatch::DispatchProgress>();
    let printer = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            println!("  {}", progress.status);
        }
    });

    let mut sequencer = SequencerBuilder::from_config(
        PrintingGateway {
            fail_page: cli_args.fail_page,
        },
        &config,
    )
    .build();

    let message = Message {
        text: session.text().to_string(),
        mms: session.is_mms(),
    };
    let recipient_count = session.recipients().len();

    let mut progress = ChannelProgress::new(tx);
    let outcome = session
        .send(&mut sequencer, &mut progress, &CancelHandle::new())
        .await;
    drop(progress);
    printer.await?;
    let outcome = outcome?;

    println!("Result: {outcome}");

    let mut history = MemoryHistory::new();
    history.append(HistoryRecord::from_outcome(
        &outcome,
        &message,
        recipient_count,
        &config.cost_model(),
    ));
    let usage = history.usage(&HistoryFilter::default());
    println!(
        "History: {} job(s), {} page(s) sent, {} point(s) charged",
        usage.jobs, usage.pages_sent, usage.points_spent
    );

    Ok(())
}

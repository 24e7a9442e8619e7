use blackjack::{
    create_seeded_cpu_brain, Brain, BrainType, Card, Decision, GameEvent, Hand, HumanBrain, HumanInput,
    PayoutRatio, Prompt, Rules, RulesPreset, Seat, SettlementSummary, Table,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

type BoxErr = Box<dyn std::error::Error + Send + Sync>;

const HUMAN_SEAT: &str = "you";

#[derive(Parser)]
#[command(name = "blackjack-table", about = "Play blackjack rounds against scripted and human seats")]
struct Cli {
    /// Rule preset: vegas, atlantic-city, european or custom
    #[arg(long, env = "TABLE_PRESET", default_value = "vegas")]
    preset: String,

    /// Scripted seats by brain name (easy, medium, hard, random, basic, heuristic)
    #[arg(long, env = "TABLE_SEATS", value_delimiter = ',', default_value = "basic,heuristic")]
    seats: Vec<String>,

    /// Take a seat yourself, answering prompts on stdin
    #[arg(long, env = "TABLE_HUMAN")]
    human: bool,

    #[arg(long, env = "TABLE_ROUNDS", default_value_t = 5)]
    rounds: u32,

    /// Starting chips for every seat
    #[arg(long, env = "TABLE_BALANCE", default_value_t = 1000)]
    balance: u64,

    /// Seed for the shoe and the scripted brains; random when omitted
    #[arg(long, env = "TABLE_SEED")]
    seed: Option<u64>,

    /// Print the round history as JSON when done
    #[arg(long)]
    json: bool,

    /// Override the preset's deck count
    #[arg(long)]
    decks: Option<u8>,

    #[arg(long)]
    min_bet: Option<u64>,

    #[arg(long)]
    max_bet: Option<u64>,

    /// Blackjack payout ratio (e.g. "6:5")
    #[arg(long)]
    blackjack_payout: Option<String>,

    #[arg(long, action = clap::ArgAction::Set)]
    dealer_hits_soft_17: Option<bool>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::error!("Table failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BoxErr> {
    let rules = build_rules(&cli)?;
    log::info!(
        "Rules: {} decks, blackjack pays {}, dealer {} soft 17, bets {}-{}",
        rules.deck_count,
        rules.blackjack_payout,
        if rules.dealer_hits_soft_17 { "hits" } else { "stands on" },
        rules.min_bet,
        rules.max_bet
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(play(cli, rules))
}

fn build_rules(cli: &Cli) -> Result<Rules, BoxErr> {
    let preset: RulesPreset = cli.preset.parse()?;
    let payout = cli
        .blackjack_payout
        .as_deref()
        .map(str::parse::<PayoutRatio>)
        .transpose()?;

    let rules = preset.rules().update(|rules| {
        if let Some(decks) = cli.decks {
            rules.deck_count = decks;
        }
        if let Some(min_bet) = cli.min_bet {
            rules.min_bet = min_bet;
        }
        if let Some(max_bet) = cli.max_bet {
            rules.max_bet = max_bet;
        }
        if let Some(payout) = payout {
            rules.blackjack_payout = payout;
        }
        if let Some(h17) = cli.dealer_hits_soft_17 {
            rules.dealer_hits_soft_17 = h17;
        }
    })?;
    Ok(rules)
}

async fn play(cli: Cli, rules: Rules) -> Result<(), BoxErr> {
    let seed = cli.seed.unwrap_or_else(rand::random);
    log::info!("Seed {seed} (pass --seed {seed} to replay)");

    let mut seats: Vec<(Seat, Box<dyn Brain>)> = Vec::new();
    let mut human_input = None;

    if cli.human {
        let (brain, input) = HumanBrain::new();
        input.set_prompt_hook(print_prompt);
        seats.push((
            Seat::new(HUMAN_SEAT, "You", cli.balance, BrainType::Human),
            Box::new(brain) as Box<dyn Brain>,
        ));
        human_input = Some(input);
    }

    for (i, kind) in cli.seats.iter().enumerate() {
        let brain_type: BrainType = kind.parse()?;
        if brain_type == BrainType::Human {
            return Err("use --human to take a seat yourself".into());
        }
        let brain = create_seeded_cpu_brain(kind, seed.wrapping_add(i as u64 + 1))?;
        let id = format!("cpu{}", i + 1);
        let name = format!("CPU {} ({brain_type})", i + 1);
        seats.push((Seat::new(id, name, cli.balance, brain_type), brain));
    }

    let mut table = Table::with_seed(rules, seats, seed)?;
    table.subscribe(|event: &GameEvent| log::debug!("{event:?}"));

    let reader = human_input.map(|input| tokio::spawn(read_stdin(input)));

    for _ in 0..cli.rounds {
        let min_bet = table.state().rules().min_bet;
        if table.state().seats.iter().all(|s| s.balance < min_bet) {
            log::info!("Every seat is below the {min_bet} minimum, closing the table");
            break;
        }

        let summary = table.play_round().await?;
        print_summary(&table, &summary);
    }

    println!();
    for seat in &table.state().seats {
        println!("{:<20} {:>8}", seat.name, seat.balance);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&table.state().history)?);
    }

    if let Some(reader) = reader {
        reader.abort();
    }
    Ok(())
}

fn format_cards(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect::<Vec<_>>().join(" ")
}

fn format_hand(hand: &Hand) -> String {
    let soft = if hand.is_soft() { " soft" } else { "" };
    format!("{} ({}{soft})", format_cards(&hand.cards), hand.value)
}

fn print_prompt(prompt: &Prompt) {
    match prompt {
        Prompt::Bet(context) => {
            println!(
                "Balance {}. Bet {}-{} (empty to sit out):",
                context.balance, context.min_bet, context.max_bet
            );
        }
        Prompt::Decision(context) => {
            let options: Vec<String> = context
                .legal_decisions()
                .iter()
                .map(|d| format!("{d:?}").to_lowercase())
                .collect();
            println!(
                "Your hand {} vs dealer {}. {}?",
                format_hand(&context.hand),
                context.dealer_up_card,
                options.join(", ")
            );
        }
    }
}

fn print_summary(table: &Table, summary: &SettlementSummary) {
    let state = table.state();
    println!("== Round {} ==", summary.round_number);
    println!("{:<20} {}", "Dealer", format_hand(&state.dealer.hand));
    for result in &summary.results {
        let name = state
            .seat(&result.seat_id)
            .map(|s| s.name.as_str())
            .unwrap_or(result.seat_id.as_str());
        println!(
            "{:<20} {}  {:?} {:+}",
            name,
            format_hand(&result.final_hand),
            result.outcome,
            result.net
        );
    }
    println!("House {:+}", summary.house_net);
}

/// Routes stdin lines to whatever the human seat is waiting on.
async fn read_stdin(input: HumanInput) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => break,
        };
        let line = line.trim();

        if input.pending_decision_context().is_some() {
            match line.parse::<Decision>() {
                Ok(decision) => {
                    if !input.submit_decision(decision) {
                        println!("{decision:?} is not available here");
                    }
                }
                Err(e) => println!("{e}"),
            }
        } else if let Some(context) = input.pending_bet_context() {
            if line.is_empty() || line.eq_ignore_ascii_case("skip") {
                input.cancel_bet();
                continue;
            }
            match line.parse::<u64>() {
                Ok(amount) => {
                    input.submit_bet(amount);
                }
                Err(_) => println!(
                    "Enter an amount between {} and {}, or leave empty to sit out",
                    context.min_bet, context.max_bet
                ),
            }
        } else {
            log::debug!("Ignoring input with nothing pending: {line}");
        }
    }

    // Without input the seat stands on every hand and sits out every bet
    log::warn!("Input closed, the human seat sits out from now on");
    let closer = input.clone();
    input.set_prompt_hook(move |_| {
        closer.cancel_bet();
        closer.cancel_decision();
    });
    input.cancel_bet();
    input.cancel_decision();
}

use chiptally::agents::{simulate_hands, RandomAgent};
use chiptally::clock::ManualClock;
use chiptally::rules::GameRules;
use chiptally::service::TableService;
use chiptally::store::MemoryStore;
use chiptally::table::{Identity, Table, TableId};
use chiptally::TableError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: chiptally-sim [texas|zhajinhua|<rules.json>] [hands] [seats] [seed]";

struct Args {
    rules: GameRules,
    hands: usize,
    seats: usize,
    seed: u64,
}

fn parse_args() -> Result<Args, String> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.iter().any(|a| a == "-h" || a == "--help") {
        return Err(USAGE.to_owned());
    }
    let rules = match argv.first().map(String::as_str) {
        None | Some("texas") => GameRules::texas(),
        Some("zhajinhua") => GameRules::zhajinhua(),
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
            GameRules::from_json(&raw).map_err(|e| format!("{path}: {e}"))?
        }
    };
    let num = |i: usize, default: u64| -> Result<u64, String> {
        argv.get(i).map_or(Ok(default), |v| {
            v.parse().map_err(|_| format!("not a number: {v}\n{USAGE}"))
        })
    };
    Ok(Args { rules, hands: num(1, 10)? as usize, seats: num(2, 4)? as usize, seed: num(3, 42)? })
}

fn run(args: Args) -> Result<(), TableError> {
    let service = TableService::new(MemoryStore::new(), ManualClock::new(0));
    let host = Identity::from("host");
    let id = TableId::from("sim");

    let mut table = Table::new(id.clone(), args.rules, Some(host.clone()));
    for i in 1..=args.seats {
        table.seat(format!("p{i}"), format!("Bot {i}"), Some(format!("bot-{i}").into()))?;
    }
    service.create_table(table)?;

    let mut agent = RandomAgent::new(args.seed);
    let report = simulate_hands(&service, &id, &host, &mut agent, args.hands)?;
    let table = service.table(&id)?;

    println!("hands played: {}", report.hands);
    println!("actions: {} (rejected proposals: {})", report.actions, report.rejected);
    println!("chips: {} -> {}", report.chips_before, report.chips_after);
    for seat in &table.seats {
        println!("  {:<8} {:>8}  {:?}", seat.name, seat.stack, seat.status);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = match parse_args() {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("simulation failed: {} ({err})", err.code());
            ExitCode::FAILURE
        }
    }
}

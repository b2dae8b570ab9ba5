use crate::api::client::ApiClient;
use crate::api::types::{CalculationRecord, Credentials};
use crate::api::PricingApi;
use crate::pricing::input::CalculationInput;
use crate::pricing::pipeline::CalculationPipeline;
use crate::routes::{private_route, public_route, RouteDecision, View};
use crate::session::SessionStore;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Runtime;

/// Interactive desk loop. Each command corresponds to a screen, and
/// screen entry always goes through the route guard first. Async work is
/// block_on'd one operation at a time: single-threaded cooperative,
/// nothing else is pending while a call is in flight.
pub fn run(
    rt: &Runtime,
    session: &SessionStore<ApiClient>,
    pipeline: &CalculationPipeline<ApiClient>,
    api: &ApiClient,
) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("option desk - type 'help' for commands");

    loop {
        let line = match rl.readline("desk> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        rl.add_history_entry(command)?;

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,
            "login" => {
                if admit(public_route(&session.snapshot(), View::Login)) {
                    do_login(rt, &mut rl, session)?;
                }
            }
            "register" => {
                if admit(public_route(&session.snapshot(), View::Register)) {
                    do_register(rt, &mut rl, session)?;
                }
            }
            "whoami" => {
                let snapshot = session.snapshot();
                if admit(private_route(&snapshot, View::Identity)) {
                    if let Some(identity) = snapshot.identity {
                        println!("logged in as {}", identity.username);
                    }
                }
            }
            "calc" => {
                if admit(private_route(&session.snapshot(), View::Calculator)) {
                    do_calc(rt, &mut rl, pipeline)?;
                }
            }
            "history" => {
                if admit(private_route(&session.snapshot(), View::History)) {
                    do_history(rt, api);
                }
            }
            "logout" => {
                if let Err(e) = session.logout() {
                    println!("warning: {}", e.user_message());
                }
                println!("logged out");
            }
            other => println!("unknown command '{other}' - type 'help'"),
        }
    }

    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  login     authenticate and start a session");
    println!("  register  create an account (does not log in)");
    println!("  calc      price a call/put option pair");
    println!("  history   list past calculations");
    println!("  whoami    show the current identity");
    println!("  logout    drop the session and persisted token");
    println!("  quit      exit");
}

/// Announce and refuse anything the guard did not admit.
fn admit(decision: RouteDecision) -> bool {
    match decision {
        RouteDecision::Render(_) => true,
        RouteDecision::Placeholder => {
            println!("session check still in progress, try again in a moment");
            false
        }
        RouteDecision::RedirectReplace(View::Login) => {
            println!("not logged in - taken to login (run 'login')");
            false
        }
        RouteDecision::RedirectReplace(view) => {
            println!("already logged in - taken to {view}");
            false
        }
    }
}

fn prompt(rl: &mut DefaultEditor, label: &str) -> rustyline::Result<String> {
    Ok(rl.readline(&format!("  {label}: "))?.trim().to_string())
}

fn read_credentials(rl: &mut DefaultEditor) -> rustyline::Result<Credentials> {
    Ok(Credentials {
        username: prompt(rl, "username")?,
        password: prompt(rl, "password")?,
    })
}

fn do_login(
    rt: &Runtime,
    rl: &mut DefaultEditor,
    session: &SessionStore<ApiClient>,
) -> rustyline::Result<()> {
    let credentials = read_credentials(rl)?;
    match rt.block_on(session.login(&credentials)) {
        Ok(identity) => println!("welcome, {}", identity.username),
        Err(e) => println!("login failed: {}", e.user_message()),
    }
    Ok(())
}

fn do_register(
    rt: &Runtime,
    rl: &mut DefaultEditor,
    session: &SessionStore<ApiClient>,
) -> rustyline::Result<()> {
    let credentials = read_credentials(rl)?;
    match rt.block_on(session.register(&credentials)) {
        Ok(ack) => {
            let name = ack.username.unwrap_or(credentials.username);
            println!("account '{name}' created - run 'login' to sign in");
        }
        Err(e) => println!("registration failed: {}", e.user_message()),
    }
    Ok(())
}

fn do_calc(
    rt: &Runtime,
    rl: &mut DefaultEditor,
    pipeline: &CalculationPipeline<ApiClient>,
) -> rustyline::Result<()> {
    let input = CalculationInput {
        stock_price: prompt(rl, "stock price")?,
        strike_price: prompt(rl, "strike price")?,
        time_to_maturity: prompt(rl, "time to maturity (years)")?,
        risk_free_rate: prompt(rl, "risk-free rate (%)")?,
        dividend_yield: prompt(rl, "dividend yield (%)")?,
        volatility: prompt(rl, "volatility (%)")?,
    };

    match rt.block_on(pipeline.submit(&input)) {
        Ok(quote) => {
            println!("call option price: {:.4}", quote.call_option_price);
            println!("put option price:  {:.4}", quote.put_option_price);
        }
        Err(e) => println!("{}", e.user_message()),
    }
    Ok(())
}

fn do_history(rt: &Runtime, api: &ApiClient) {
    match rt.block_on(api.calculations()) {
        Ok(records) if records.is_empty() => println!("no calculations found"),
        Ok(records) => print_history(&records),
        Err(_) => println!("Failed to fetch calculations. Please try again later."),
    }
}

fn print_history(records: &[CalculationRecord]) {
    println!(
        "{:>4}  {:>10}  {:>10}  {:>8}  {:>7}  {:>7}  {:>7}  {:>10}  {:>10}  {}",
        "id", "stock", "strike", "T(yrs)", "rate%", "yield%", "vol%", "call", "put", "timestamp"
    );
    for r in records {
        let ts = r
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:>4}  {:>10.2}  {:>10.2}  {:>8.2}  {:>7.2}  {:>7.2}  {:>7.2}  {:>10.4}  {:>10.4}  {}",
            r.id,
            r.stock_price,
            r.strike_price,
            r.time_to_maturity,
            r.risk_free_rate * 100.0,
            r.dividend_yield * 100.0,
            r.volatility * 100.0,
            r.call_option_price,
            r.put_option_price,
            ts
        );
    }
}

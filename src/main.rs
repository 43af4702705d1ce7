//!
//! rolegate CLI binary
//! -------------------
//! Line-oriented front end for the DID login session. Composes the development
//! identity provider and the HTTP backend client into a session machine, then
//! renders one view per session state.

use std::collections::HashMap;
use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use rolegate::config::{ENV_BACKEND_URL, ENV_ENROLMENT_URL, ENV_WALLET_MODE};
use rolegate::{Config, DevIdentityProvider, Did, HttpAuthClient, SessionState, SessionStateMachine, WalletMode};

const ENV_DEV_DID: &str = "ROLEGATE_DEV_DID";
const DEFAULT_RETURN_URL: &str = "http://localhost/";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--backend <url>] [--did <did>] [--enrolment <url>] [--return-url <url>] [--wallet <mode>] [--login]\n\nFlags:\n  --backend <url>      Backend authorization service base URL (env: {ENV_BACKEND_URL})\n  --did <did>          DID resolved by the development wallet (env: {ENV_DEV_DID})\n  --enrolment <url>    Enrolment deep link offered when a role is missing (env: {ENV_ENROLMENT_URL})\n  --return-url <url>   URL the enrolment flow returns to (default: {DEFAULT_RETURN_URL})\n  --wallet <mode>      extension | relay (env: {ENV_WALLET_MODE}, default: relay)\n  --login              Run a single login attempt and exit (status 1 unless authenticated)\n  -h, --help           Show this help\n\nInteractive commands:\n  login [extension|relay]   start a login attempt\n  logout                    leave the authenticated session\n  status                    show the current session state\n  help                      show this help\n  quit | exit               exit the interpreter"
    );
}

/// One view per state, mirroring what a graphical front end would show.
fn render(state: &SessionState, cfg: &Config, return_url: &str) {
    match state {
        SessionState::Idle => println!("Not logged in. Use 'login extension' or 'login relay'."),
        SessionState::Connecting => println!("Loading... (please sign messages using your connected wallet)"),
        SessionState::Authenticated { did, roles } => {
            println!("Hello user!");
            println!("Your decentralised identifier: {}", did);
            if !roles.is_empty() {
                println!("These are your validated roles:");
                for r in roles { println!("  {}", r); }
            }
        }
        SessionState::Unauthorized | SessionState::Errored { .. } => {}
    }
    if let Some(rem) = state.remediation() {
        println!("{}", rem.message());
        if rem.offers_enrolment() {
            if let Some(link) = cfg.enrolment_link(return_url) {
                println!("Use the enrolment link to request the necessary role: {}", link);
            }
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut overrides: HashMap<&'static str, String> = HashMap::new();
    let mut did_arg: Option<String> = None;
    let mut return_url = DEFAULT_RETURN_URL.to_string();
    let mut one_shot = false;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let needs_value = matches!(flag, "--backend" | "--did" | "--enrolment" | "--return-url" | "--wallet");
        if needs_value && i + 1 >= args.len() {
            eprintln!("{} requires a value", flag);
            print_usage(&program);
            std::process::exit(2);
        }
        match flag {
            "--backend" => { overrides.insert(ENV_BACKEND_URL, args[i + 1].clone()); }
            "--enrolment" => { overrides.insert(ENV_ENROLMENT_URL, args[i + 1].clone()); }
            "--wallet" => { overrides.insert(ENV_WALLET_MODE, args[i + 1].clone()); }
            "--did" => { did_arg = Some(args[i + 1].clone()); }
            "--return-url" => { return_url = args[i + 1].clone(); }
            "--login" => { one_shot = true; i += 1; continue; }
            "-h" | "--help" => { print_usage(&program); return Ok(()); }
            unk => {
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
        i += 2;
    }

    let cfg = Config::from_lookup(|k| overrides.get(k).cloned().or_else(|| env::var(k).ok()))?;
    let did_raw = did_arg
        .or_else(|| env::var(ENV_DEV_DID).ok())
        .ok_or_else(|| anyhow!("a DID is required: pass --did or set {}", ENV_DEV_DID))?;
    let did = Did::parse(did_raw).ok_or_else(|| anyhow!("DID must not be empty"))?;

    info!(
        target: "rolegate",
        "rolegate starting: backend='{}', timeout_secs={}, wallet={}, enrolment={}",
        cfg.backend_url, cfg.request_timeout.as_secs(), cfg.wallet_mode, cfg.enrolment_url.is_some()
    );

    let identity = Arc::new(DevIdentityProvider::new(did));
    let auth = Arc::new(HttpAuthClient::from_config(&cfg)?);
    let sm = SessionStateMachine::new(identity, auth);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    if one_shot {
        let st = rt.block_on(sm.login(cfg.wallet_mode))?;
        render(&st, &cfg, &return_url);
        if !st.is_authenticated() { std::process::exit(1); }
        return Ok(());
    }

    run_repl(&rt, &sm, &cfg, &return_url)
}

fn run_repl(rt: &tokio::runtime::Runtime, sm: &SessionStateMachine, cfg: &Config, return_url: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("rolegate interpreter. Type 'help' for commands.");
    render(&sm.state(), cfg, return_url);
    loop {
        input.clear();
        print!("> "); let _ = stdout.flush();
        match stdin.read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = input.trim();
        if line.is_empty() { continue; }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0].to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" => print_usage("rolegate"),
            "status" => render(&sm.state(), cfg, return_url),
            "logout" => {
                if !sm.logout() { println!("not logged in"); }
                render(&sm.state(), cfg, return_url);
            }
            "login" => {
                let mode = match parts.get(1) {
                    Some(m) => match m.parse::<WalletMode>() {
                        Ok(mode) => mode,
                        Err(e) => { eprintln!("{}", e); continue; }
                    },
                    None => cfg.wallet_mode,
                };
                render(&SessionState::Connecting, cfg, return_url);
                match rt.block_on(sm.login(mode)) {
                    Ok(st) => render(&st, cfg, return_url),
                    Err(e) => eprintln!("error: {}", e),
                }
            }
            other => eprintln!("unknown command '{}'; type 'help'", other),
        }
    }
    Ok(())
}

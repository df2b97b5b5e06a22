use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tokio::io::{ AsyncBufReadExt, BufReader };

use yagpt_relay::composer::settings::{ SendMode, Settings, Theme };
use yagpt_relay::composer::store::PrefStore;
use yagpt_relay::composer::terminal::TerminalFrontend;
use yagpt_relay::composer::{ ChatSession, Frontend, HttpRelay };

/// Terminal composer for the chat relay.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the relay server.
    #[arg(long, env = "RELAY_URL", default_value = "http://127.0.0.1:3000")]
    relay_url: String,

    /// Path of the preference file holding settings and theme.
    #[arg(long, env = "COMPOSER_PREFS", default_value = ".composer/prefs.json")]
    prefs_path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut store = PrefStore::open(&args.prefs_path);
    let settings = Settings::load(&store);
    let mut theme = Theme::load(&store);

    let relay = Arc::new(HttpRelay::new(args.relay_url.clone()));
    let mut session = ChatSession::new(relay, settings);
    let mut ui = TerminalFrontend::new(theme);

    println!("Relay: {}", args.relay_url);
    println!(
        "Commands: /system <text>, /mode on_save|each_message, /temp <0..1>, /save, /theme, /quit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();

        if line == "/quit" || line == "/exit" {
            break;
        } else if line == "/theme" {
            theme = theme.toggled();
            ui.set_theme(theme);
            theme.save(&mut store)?;
            ui.notice(&format!("theme: {}", theme.name()));
        } else if let Some(rest) = line.strip_prefix("/system") {
            session.settings.system_prompt = rest.trim().to_string();
            ui.notice("system prompt updated (use /save to persist)");
        } else if let Some(rest) = line.strip_prefix("/mode") {
            match rest.trim() {
                "on_save" => {
                    session.settings.send_mode = SendMode::OnSave;
                    ui.notice("mode: on_save");
                }
                "each_message" => {
                    session.settings.send_mode = SendMode::EachMessage;
                    ui.notice("mode: each_message");
                }
                _ => ui.notice("usage: /mode on_save|each_message"),
            }
        } else if let Some(rest) = line.strip_prefix("/temp") {
            match rest.trim().parse::<f64>() {
                Ok(temperature) => {
                    session.settings.temperature = temperature;
                    ui.notice(&format!("temperature: {}", temperature));
                }
                Err(_) => ui.notice("usage: /temp <number>"),
            }
        } else if line == "/save" {
            session.settings.save(&mut store)?;
            ui.notice("settings saved");
            session.apply_saved_settings(&mut ui);
        } else if line.starts_with('/') {
            ui.notice("unknown command");
        } else {
            session.submit(&line, &mut ui).await;
        }
    }

    Ok(())
}

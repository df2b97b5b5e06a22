use clap::Parser;

use crate::llm::completion::COMPLETION_URL;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Port for the HTTP server to listen on.
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Directory of browser assets served at the site root.
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: String,

    /// API key for the Yandex Foundation Models API. Without it the relay
    /// endpoint answers with a configuration error; health and static
    /// serving keep working.
    #[arg(long, env = "YANDEX_API_KEY")]
    pub api_key: Option<String>,

    /// Folder id completion requests are issued against (also sent as the
    /// x-folder-id header).
    #[arg(long, env = "YANDEX_FOLDER_ID")]
    pub folder_id: Option<String>,

    /// Model segment of the modelUri (gpt://<folder>/<model>).
    #[arg(long, env = "YANDEX_MODEL", default_value = "yandexgpt/latest")]
    pub model: String,

    /// Completion endpoint URL. Overridable for tests and compatible
    /// gateways.
    #[arg(long, env = "YANDEX_COMPLETION_URL", default_value = COMPLETION_URL)]
    pub completion_url: String,
}

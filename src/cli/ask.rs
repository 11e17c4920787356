use anyhow::Result;

use crate::chat::Session;
use crate::core::AppConfig;
use crate::deepseek::DeepSeekClient;

pub async fn run(message: &str, config: AppConfig) -> Result<()> {
    let client = DeepSeekClient::new(&config);
    let mut session = Session::new();
    let turn = session.submit(message, &client).await;
    println!("{}", turn.reply?);
    Ok(())
}

// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use mimalloc::MiMalloc;
use modules::{
    common::rustls::MailboxTls,
    context::{Initialize, MailboxContext},
    error::MailboxResult,
    logger,
    rest::start_http_server,
    settings::{cli::SETTINGS, dir::DataDirManager},
};
use tracing::{error, info};

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

static LOGO: &str = r#"
  ____            _   __  __       _ _ _               
 |  _ \ _   _ ___| |_|  \/  | __ _(_) | |__   _____  __
 | |_) | | | / __| __| |\/| |/ _` | | | '_ \ / _ \ \/ /
 |  _ <| |_| \__ \ |_| |  | | (_| | | | |_) | (_) >  < 
 |_| \_\\__,_|___/\__|_|  |_|\__,_|_|_|_.__/ \___/_/\_\
                                                       
"#;

#[tokio::main]
async fn main() -> MailboxResult<()> {
    logger::initialize_logging();
    info!("{}", LOGO);
    info!("Starting rustmailbox");
    info!("Version:  {}", rustmailbox_version!());
    info!("Git:      [{}]", env!("GIT_HASH"));
    info!("Built:    {}", env!("BUILD_TIME"));

    let ctx = match initialize().await {
        Ok(ctx) => ctx,
        Err(error) => {
            eprintln!("{:?}", error);
            return Err(error);
        }
    };

    if let Err(e) = start_http_server(ctx, &SETTINGS).await {
        error!("Failed to start REST server: {}", e);
        return Err(e);
    }
    info!("rustmailbox stopped");
    Ok(())
}

/// Prepares the data directory and crypto provider, then wires the mailbox adapters.
async fn initialize() -> MailboxResult<MailboxContext> {
    DataDirManager::initialize().await?;
    MailboxTls::initialize().await?;
    let ctx = MailboxContext::build(&SETTINGS).await?;
    info!(
        "Mailbox table '{}' (indices '{}', '{}'), bucket '{}' in region {}",
        ctx.env.table_name,
        ctx.env.time_index,
        ctx.env.original_index,
        ctx.env.bucket,
        ctx.env.region
    );
    Ok(ctx)
}

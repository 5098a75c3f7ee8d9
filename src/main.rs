use meteoseries::{
    import,
    store::PointStore,
    util::{config::get_config, connect_to_db, setup_tracing},
    web_interface,
};
use std::{env, process::exit};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    if let (Some(build_timestamp), Some(rustc_semver)) = (
        option_env!("VERGEN_BUILD_TIMESTAMP"),
        option_env!("VERGEN_RUSTC_SEMVER"),
    ) {
        info!(
            "Meteoseries {} (built {} with rustc {})",
            env!("CARGO_PKG_VERSION"),
            build_timestamp,
            rustc_semver
        );
    }

    let ref args: Vec<String> = env::args().collect();

    let choice = args.get(1).cloned().unwrap_or("web".into());

    let http_addr = get_config().get_string("http_addr")?;
    let store = PointStore::new(connect_to_db().await?);

    let result = match choice.as_str() {
        "web" => web_interface::start_server(store.clone(), http_addr).await,
        "import" => import::start_import(store.clone(), args.get(2).cloned()).await,
        "all" => match import::start_import(store.clone(), None).await {
            Ok(()) => web_interface::start_server(store.clone(), http_addr).await,
            Err(err) => Err(err),
        },
        _ => {
            println!("Make a valid choice (web, import [path], all)");
            Ok(())
        }
    };

    store.close().await;
    handle_result(result);

    Ok(())
}

fn handle_result(res: anyhow::Result<()>) {
    if let Err(err) = res {
        error!("An error occurred: {:?}", err);
        exit(1)
    }
}

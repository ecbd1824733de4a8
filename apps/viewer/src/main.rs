use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use meshview_config::SceneConfig;
use meshview_connection::{InboundMessage, SocketClient, WsConnector};
use meshview_scene::{AssetFetcher, HttpFetcher, SceneAssetManager};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// WebSocket endpoint to receive viewer commands from
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    endpoint: String,

    /// Model to load at startup
    #[arg(long)]
    model: Option<String>,

    /// Scene configuration document
    #[arg(long, default_value = "config/scene.json")]
    config: PathBuf,

    /// Delay between reconnect attempts in milliseconds
    #[arg(long, default_value_t = 5000)]
    reconnect_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("tungstenite", log::LevelFilter::Warn)
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("hyper", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let config = SceneConfig::load(&args.config);
    log::info!(
        "Scene config: background {}, camera fov {}, {} directional light(s)",
        config.background,
        config.camera.fov,
        config.lights.directional.len()
    );

    let mut manager = SceneAssetManager::new(HttpFetcher::new());
    if let Some(model) = &args.model {
        load_model(&mut manager, model).await;
    }

    let (client, mut inbound) = SocketClient::connect_with(
        &args.endpoint,
        Duration::from_millis(args.reconnect_delay_ms),
        WsConnector,
    );
    log::info!("Connecting to {}", args.endpoint);

    while let Some(message) = inbound.recv().await {
        match message {
            InboundMessage::Structured { data, size } => {
                log::debug!("Structured message ({size} bytes)");
                handle_command(&mut manager, &client, &data).await;
            }
            InboundMessage::Text { data, size } => {
                log::info!("Text message ({size} bytes): {data}");
            }
            InboundMessage::Binary { size, .. } => {
                log::info!("Binary message ({size} bytes)");
            }
        }
    }

    client.shutdown().await;
    manager.dispose();
    Ok(())
}

/// Commands are JSON objects: `{"model": "<url>"}` swaps the scene,
/// `{"visibility": {"<mesh>": bool}}` toggles meshes by name.
async fn handle_command(
    manager: &mut SceneAssetManager<HttpFetcher>,
    client: &SocketClient,
    data: &serde_json::Value,
) {
    if let Some(url) = data.get("model").and_then(|value| value.as_str()) {
        load_model(manager, url).await;
        client.send(&format!(
            "{{\"loaded\":{},\"meshes\":{}}}",
            manager.last_error().is_none(),
            manager.mesh_records().len()
        ));
    }

    if let Some(visibility) = data.get("visibility").and_then(|value| value.as_object()) {
        let map = visibility
            .iter()
            .filter_map(|(name, value)| value.as_bool().map(|v| (name.clone(), v)))
            .collect();
        manager.apply_visibility(&map);
    }
}

async fn load_model<F: AssetFetcher>(manager: &mut SceneAssetManager<F>, url: &str) {
    let mut last_reported = -1i32;
    let mut on_progress = |value: f32| {
        let percent = value as i32;
        if percent / 10 > last_reported / 10 {
            last_reported = percent;
            log::info!("Downloading model: {percent}%");
        }
    };

    match manager.load(url, Some(&mut on_progress)).await {
        Ok(scene) => {
            for record in &scene.mesh_records {
                log::info!(
                    "Mesh {} (material {}): {} vertices, {} triangles at {:?}",
                    record.name,
                    record.material_name,
                    record.vertex_count,
                    record.triangle_count,
                    record.translation
                );
            }
        }
        Err(err) => log::error!("Failed to load {url}: {err}"),
    }
}

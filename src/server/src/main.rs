use std::net::SocketAddr;
use std::process::exit;
use std::str::FromStr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use strata_math::Vector3f;
use strata_net::{build_default_dispatch, session, NetworkViewer};
use strata_world::{GeneratedChunkProvider, World, WorldConfig};
use tokio::net::TcpListener;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::subscriber::with_default;
use tracing::{error, info};
use uuid::Uuid;

use strata_config::build_config_from_env;
use strata_log::configure_logger;

mod commands;
mod console;

const BANNER: &str = r"
> Strata - a voxel multiplayer world-tick core";

fn world_config(world: &strata_config::World) -> WorldConfig {
    let [x, y, z] = world.spawn_position;

    WorldConfig {
        view_distance: world.view_distance,
        spawn_position: Vector3f::new(x, y, z),
        spawn_angle: world.spawn_angle,
        tick_rate_hz: world.tick_rate_hz,
        global_chunk_load_rate: world.global_chunk_load_rate,
        player_chunk_load_rate: world.player_chunk_load_rate,
    }
}

#[tokio::main]
async fn main() {
    let tmp_logger = strata_log::configure_temporary_logger();

    let config = match build_config_from_env() {
        Ok(config) => config,
        Err(err) => {
            with_default(tmp_logger, || {
                error!(%err, "error reading configuration file");
                error!("launch interrupted");
            });
            exit(1);
        }
    };

    drop(tmp_logger);

    let config = config.into_inner();
    let _guard = configure_logger(&config.log);

    info!("{}", BANNER);

    let world = Arc::new(Mutex::new(World::new(
        GeneratedChunkProvider::default(),
        world_config(&config.world),
    )));

    let dispatch = Arc::new(build_default_dispatch::<GeneratedChunkProvider>());
    let cancel = CancellationToken::new();

    spawn_console(world.clone(), &cancel);
    spawn_ticker(world.clone(), config.world.tick_rate_hz, cancel.clone());
    spawn_listener(world.clone(), dispatch, config.network.port, config.network.outbound_queue_capacity, cancel.clone()).await;

    select! {
        _ = cancel.cancelled() => {}
    }

    info!("shutting down");
}

fn spawn_console(world: Arc<Mutex<World<GeneratedChunkProvider>>>, cancel: &CancellationToken) {
    let (commands_tx, commands_rx) = flume::bounded::<String>(8);
    let console_cancel = cancel.clone();

    std::thread::spawn(move || {
        console::Console::new(commands_tx, console_cancel).serve();
    });

    tokio::spawn(async move {
        while let Ok(line) = commands_rx.recv_async().await {
            commands::handle_command(&line, &world);
        }
    });
}

async fn spawn_listener(
    world: Arc<Mutex<World<GeneratedChunkProvider>>>,
    dispatch: Arc<strata_net::Dispatch<GeneratedChunkProvider>>,
    port: u16,
    outbound_capacity: usize,
    cancel: CancellationToken,
) {
    let addr = SocketAddr::from_str(&format!("0.0.0.0:{port}")).expect("valid bind address");
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %addr, "could not bind listening socket");
            exit(1);
        }
    };

    info!(%addr, "listening for connections");

    let next_conn_id = Arc::new(AtomicI32::new(0));

    tokio::spawn(async move {
        loop {
            select! {
                _ = cancel.cancelled() => return,
                accepted = listener.accept() => {
                    let Ok((stream, peer)) = accepted else {
                        continue;
                    };

                    let conn_id = next_conn_id.fetch_add(1, Ordering::Relaxed);
                    info!(conn_id, %peer, "client connected");

                    let (outbound_tx, outbound_rx) = flume::bounded(outbound_capacity);
                    let viewer: Arc<dyn strata_world::viewer::Viewer> = Arc::new(NetworkViewer::new(outbound_tx));

                    let entity_id = world.lock().unwrap().add_player(Uuid::new_v4(), viewer);

                    let world = world.clone();
                    let dispatch = dispatch.clone();

                    tokio::spawn(async move {
                        session::run(stream, conn_id, world.clone(), dispatch, entity_id, outbound_rx).await;

                        info!(conn_id, entity_id, "client disconnected");
                        world.lock().unwrap().remove_player(entity_id);
                    });
                }
            }
        }
    });
}

fn spawn_ticker(world: Arc<Mutex<World<GeneratedChunkProvider>>>, tick_rate_hz: u32, cancel: CancellationToken) {
    let tick_duration = Duration::from_millis(1000 / tick_rate_hz.max(1) as u64);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_duration);

        loop {
            select! {
                _ = cancel.cancelled() => return,
                _ = interval.tick() => {
                    strata_world::with_world(&world, |world| world.tick());
                }
            }
        }
    });
}

use log::{info, warn};
use tokio::{net::TcpListener, signal, task};
use tokio_util::sync::CancellationToken;

use training_node::{
    Artifact, DryRunEngine, LabelSource, LocalStore, NodeConfig, ObjectStore, TrainingSession,
    artifact, control, samples,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = NodeConfig::from_env()?;
    let store = LocalStore::new(&config.store_root, &config.cache_dir);

    let network =
        artifact::resolve_network(&store, &config.network_key, config.resume_key.as_deref())?;
    info!(layers = network.layers().count(), stages = network.stages.len(); "network ready");

    let data_dir = store.fetch(&config.data_key)?;

    let labels = LabelSource::load(data_dir.join(&config.labels_file), network.classification)?;
    if network.output_width() != Some(labels.num_labels()) {
        warn!(
            "label table has {} label(s), the output layer produces {:?}",
            labels.num_labels(),
            network.output_width()
        );
    }

    let files = samples::enumerate(&data_dir, &config.labels_file)?;
    let records = samples::records(&files, &labels);
    info!(samples = files.len(), records = records.len(); "dataset ready");

    let token = CancellationToken::new();

    let listener = TcpListener::bind(&config.control_addr).await?;
    let server = tokio::spawn(control::serve(listener, token.clone()));

    let interrupt = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            res = signal::ctrl_c() => match res {
                Ok(()) => {
                    info!("interrupted, stopping training");
                    interrupt.cancel();
                }
                Err(e) => warn!("cannot listen for ctrl-c: {e}"),
            },
            _ = interrupt.cancelled() => {}
        }
    });

    let session = TrainingSession::new(network.clone(), records, config.max_epochs);
    let session_token = token.clone();
    let report = task::spawn_blocking(move || session.run(&mut DryRunEngine, &session_token)).await?;

    // Stops the control endpoint whether or not training ended on its own.
    token.cancel();
    server.await??;
    let report = report?;

    let local = config.cache_dir.join(&config.artifact_key);
    Artifact { network, report }.save(&local)?;
    store.store(&local, &config.artifact_key)?;

    info!(epochs = report.epochs; "training node finished");
    Ok(())
}

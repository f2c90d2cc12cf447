use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use iterative_zkp::relations::KnownPublicKey;
use iterative_zkp::relations::discrete_log::{
    CheatingDlogProver, DlogGroup, DlogProver, DlogSecret, DlogVerifier,
};
use iterative_zkp::relations::graph_isomorphism::{
    CheatingGraphProver, GraphProver, GraphSecret, GraphVerifier,
};
use iterative_zkp::{PrivateKey, SecureRng, Session, SessionConfig, SessionOutcome};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Relation {
    /// Discrete log in the RFC 5114 2048-bit group
    Dlog,
    /// Isomorphism between two random graphs
    Graph,
}

#[derive(Parser, Debug)]
#[command(name = "zkp-session")]
#[command(about = "Runs an interactive zero-knowledge proof session in process", long_about = None)]
#[command(version)]
struct Args {
    /// Relation to prove knowledge of
    #[arg(short, long, value_enum, default_value = "dlog")]
    relation: Relation,

    /// Rounds the verifier requires (overrides configuration)
    #[arg(short = 'n', long, env = "ZKP_ROUNDS")]
    rounds: Option<u64>,

    /// Vertex count for the graph relation
    #[arg(long, default_value = "16")]
    vertices: usize,

    /// Run a prover that knows only the public key
    #[arg(long, default_value = "false")]
    cheat: bool,
}

async fn run_dlog(config: SessionConfig, cheat: bool) -> iterative_zkp::Result<SessionOutcome> {
    let group = Arc::new(DlogGroup::rfc5114());
    let secret = DlogSecret::random(Arc::clone(&group), &mut SecureRng::default());
    let key = Arc::new(PrivateKey::with_generator(secret));
    let public_key = key.public_key()?.clone();
    info!(y = %public_key, "generated discrete-log key pair");

    if cheat {
        let known = Arc::new(PrivateKey::with_generator(KnownPublicKey(public_key.clone())));
        Session::new(
            known,
            CheatingDlogProver::new(Arc::clone(&group)),
            public_key,
            DlogVerifier::new(group),
            config,
        )?
        .run()
        .await
    } else {
        Session::new(
            key,
            DlogProver::new(),
            public_key,
            DlogVerifier::new(group),
            config,
        )?
        .run()
        .await
    }
}

async fn run_graph(
    config: SessionConfig,
    vertices: usize,
    cheat: bool,
) -> iterative_zkp::Result<SessionOutcome> {
    let secret = GraphSecret::random(vertices, &mut SecureRng::default());
    let key = Arc::new(PrivateKey::with_generator(secret));
    let public_key = key.public_key()?.clone();
    info!(
        vertices,
        edges = public_key.g0().edge_count(),
        "generated graph isomorphism key pair"
    );

    if cheat {
        let known = Arc::new(PrivateKey::with_generator(KnownPublicKey(public_key.clone())));
        Session::new(
            known,
            CheatingGraphProver::new(),
            public_key,
            GraphVerifier,
            config,
        )?
        .run()
        .await
    } else {
        Session::new(key, GraphProver::new(), public_key, GraphVerifier, config)?
            .run()
            .await
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = SessionConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        SessionConfig::default()
    });
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }

    if let Err(e) = config.validate() {
        return Err(format!("Invalid configuration: {e}").into());
    }
    if args.vertices < 2 {
        return Err("Graph relation needs at least 2 vertices".into());
    }

    info!(
        relation = ?args.relation,
        rounds = config.rounds,
        cheat = args.cheat,
        soundness_error = config.soundness_error(),
        "running session"
    );

    let outcome = match args.relation {
        Relation::Dlog => run_dlog(config, args.cheat).await?,
        Relation::Graph => run_graph(config, args.vertices, args.cheat).await?,
    };

    match outcome {
        SessionOutcome::Accepted { rounds } => {
            println!("accepted after {rounds} rounds");
            Ok(ExitCode::SUCCESS)
        }
        SessionOutcome::Rejected { round, reason } => {
            println!("rejected in round {round}: {reason}");
            Ok(ExitCode::FAILURE)
        }
    }
}

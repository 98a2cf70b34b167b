//! Shared fixtures for lifecycle integration tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use admin_api::config::schema::ServiceConfig;
use admin_api::lifecycle::startup::ServerOptions;

/// A ready-to-serve configuration rooted in a temp directory: the policy
/// file exists, the database lands next to it, and the listener binds an
/// ephemeral loopback port.
pub struct Fixture {
    /// Keeps the temp directory alive for the duration of the test.
    pub dir: TempDir,
    pub config: ServiceConfig,
}

/// Reserve a loopback port that nothing is listening on.
///
/// The reserving socket is dropped before the port number is returned, so
/// "nothing answers on this port" assertions do not collide with ports other
/// tests (or other processes) picked.
pub fn unused_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

pub fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let policy_path = dir.path().join("policy.csv");
    fs::write(&policy_path, "p, admin, /api/v1/*, *\n").unwrap();

    let mut config = ServiceConfig::default();
    config.application.host = "127.0.0.1".to_string();
    config.application.port = 0;
    config.database.source = dir.path().join("admin.db").to_string_lossy().into_owned();
    config.authorization.policy_path = policy_path.to_string_lossy().into_owned();

    Fixture { dir, config }
}

impl Fixture {
    /// Write the fixture's config as a settings file and return options
    /// pointing at it, as the `server` subcommand would produce them.
    pub fn server_options(&self) -> ServerOptions {
        let path: PathBuf = self.dir.path().join("settings.yml");
        fs::write(&path, serde_yaml::to_string(&self.config).unwrap()).unwrap();
        ServerOptions {
            config: path,
            port: None,
            mode: None,
        }
    }
}

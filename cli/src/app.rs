//! Application context: the production collaborators shared by commands.
//!
//! `AppContext` owns one instance of every infrastructure adapter plus the
//! host layout, and hands them to application services as port references.

use crate::application::services::install_flow::InstallDeps;
use crate::domain::InstallLayout;
use crate::infra::archive::TarGzUnpacker;
use crate::infra::assets::EmbeddedAssets;
use crate::infra::clock::SystemClock;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlSettingsStore;
use crate::infra::fs::LocalFs;
use crate::infra::http::UreqTransport;
use crate::infra::platform::HostPlatform;
use crate::output::{HumanRenderer, OutputContext};

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Print only warnings and errors.
    pub quiet: bool,
}

/// Production installation dependencies.
pub type HostDeps<'a> = InstallDeps<
    'a,
    TokioCommandRunner,
    UreqTransport,
    LocalFs,
    TarGzUnpacker,
    HostPlatform<TokioCommandRunner>,
    SystemClock,
    EmbeddedAssets,
>;

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    pub runner: TokioCommandRunner,
    pub http: UreqTransport,
    pub fs: LocalFs,
    pub unpacker: TarGzUnpacker,
    pub platform: HostPlatform<TokioCommandRunner>,
    pub clock: SystemClock,
    pub assets: EmbeddedAssets,
    pub settings: YamlSettingsStore,
    /// Canonical host paths.
    pub layout: InstallLayout,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            runner: TokioCommandRunner::default(),
            http: UreqTransport::new(),
            fs: LocalFs,
            unpacker: TarGzUnpacker,
            platform: HostPlatform::new(TokioCommandRunner::default()),
            clock: SystemClock,
            assets: EmbeddedAssets,
            settings: YamlSettingsStore,
            layout: InstallLayout::system(),
        }
    }

    /// Borrow the adapters as install-flow dependencies.
    #[must_use]
    pub fn deps(&self) -> HostDeps<'_> {
        InstallDeps {
            runner: &self.runner,
            http: &self.http,
            fs: &self.fs,
            unpacker: &self.unpacker,
            platform: &self.platform,
            clock: &self.clock,
            assets: &self.assets,
        }
    }

    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }
}

//! A single publishable package and its build/test/publish lifecycle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use log::{info, warn};

use super::DeployContext;
use super::progress::indent;
use crate::runtime::Runtime;

struct Inner {
    name: String,
    location: PathBuf,
    run_tests: bool,
    dependencies: Mutex<Vec<Application>>,
    deployed: AtomicBool,
}

/// Shared handle to a package.
///
/// Clones refer to the same package, so an application can be listed in a
/// [`super::Deployment`] and be a dependency of other applications at once;
/// the `deployed` flag is observed by every holder.
#[derive(Clone)]
pub struct Application {
    inner: Arc<Inner>,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dependencies: Vec<String> = self
            .dependencies()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        f.debug_struct("Application")
            .field("name", &self.inner.name)
            .field("location", &self.inner.location)
            .field("run_tests", &self.inner.run_tests)
            .field("dependencies", &dependencies)
            .field("deployed", &self.is_deployed())
            .finish()
    }
}

impl Application {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>, run_tests: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                location: location.into(),
                run_tests,
                dependencies: Mutex::new(Vec::new()),
                deployed: AtomicBool::new(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn location(&self) -> &Path {
        &self.inner.location
    }

    pub fn should_run_tests(&self) -> bool {
        self.inner.run_tests
    }

    /// Declare that `other` must be deployed before this application.
    pub fn depends_on(self, other: &Application) -> Self {
        self.add_dependency(other);
        self
    }

    pub fn add_dependency(&self, other: &Application) {
        self.inner
            .dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(other.clone());
    }

    /// Snapshot of the declared dependencies, in declaration order.
    pub fn dependencies(&self) -> Vec<Application> {
        self.inner
            .dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_dependencies(&self) -> bool {
        !self
            .inner
            .dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn is_deployed(&self) -> bool {
        self.inner.deployed.load(Ordering::SeqCst)
    }

    /// Whether both handles refer to the same application.
    pub fn same_as(&self, other: &Application) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Deploy every dependency that is not deployed yet, one after another.
    pub async fn deploy_dependencies_if_needed<R: Runtime>(
        &self,
        ctx: &DeployContext<'_, R>,
        version: &str,
        hierarchy: usize,
    ) -> Result<()> {
        for dependency in self.dependencies() {
            if dependency.is_deployed() {
                continue;
            }
            warn!(
                "{}Application \"{}\" depends on \"{}\", so dependency will be deployed first!",
                indent(hierarchy),
                self.name(),
                dependency.name()
            );
            Box::pin(dependency.deploy(ctx, version, hierarchy + 1)).await?;
        }
        Ok(())
    }

    pub async fn install_required_packages<R: Runtime>(
        &self,
        ctx: &DeployContext<'_, R>,
    ) -> Result<()> {
        info!("Installing required packages for \"{}\"...", self.name());

        for package in &ctx.toolchain.tooling {
            info!("{}Installing {}...", indent(1), package);
            ctx.runtime
                .run(&ctx.toolchain.install_dev([package.as_str()]), self.location())
                .await
                .with_context(|| format!("Failed to install {} for \"{}\"", package, self.name()))?;
        }

        if self.should_run_tests() && !ctx.toolchain.test_tooling.is_empty() {
            info!(
                "{}Installing {}...",
                indent(1),
                ctx.toolchain.test_tooling.join(", ")
            );
            ctx.runtime
                .run(
                    &ctx.toolchain
                        .install_dev(ctx.toolchain.test_tooling.iter().cloned()),
                    self.location(),
                )
                .await
                .with_context(|| format!("Failed to install test tooling for \"{}\"", self.name()))?;
        }

        info!("All required packages for \"{}\" were installed.", self.name());
        Ok(())
    }

    /// Run the test suite, if this application has one.
    pub async fn run_tests<R: Runtime>(&self, ctx: &DeployContext<'_, R>) -> Result<()> {
        if !self.should_run_tests() {
            return Ok(());
        }
        info!("Running tests for \"{}\"...", self.name());
        ctx.runtime
            .run(&ctx.toolchain.test(), self.location())
            .await
            .with_context(|| format!("Tests failed for \"{}\"", self.name()))
    }

    /// Deploy dependencies first, then compile, version and publish this package.
    pub async fn deploy<R: Runtime>(
        &self,
        ctx: &DeployContext<'_, R>,
        version: &str,
        hierarchy: usize,
    ) -> Result<()> {
        info!("{}Deploying \"{}\"...", indent(hierarchy), self.name());

        self.handle_dependencies(ctx, version, hierarchy).await?;
        self.compile(ctx, hierarchy).await?;
        self.publish(ctx, version, hierarchy).await?;

        self.inner.deployed.store(true, Ordering::SeqCst);
        info!(
            "{}Application \"{}\" was deployed.",
            indent(hierarchy),
            self.name()
        );
        Ok(())
    }

    async fn handle_dependencies<R: Runtime>(
        &self,
        ctx: &DeployContext<'_, R>,
        version: &str,
        hierarchy: usize,
    ) -> Result<()> {
        if !self.has_dependencies() {
            return Ok(());
        }

        self.deploy_dependencies_if_needed(ctx, version, hierarchy)
            .await?;

        info!(
            "{}Updating dependencies of \"{}\"...",
            indent(hierarchy),
            self.name()
        );
        ctx.runtime
            .run(&ctx.toolchain.upgrade_dependencies(), self.location())
            .await
            .with_context(|| format!("Failed to update dependencies of \"{}\"", self.name()))?;

        info!(
            "{}Installing dependencies for \"{}\"...",
            indent(hierarchy),
            self.name()
        );
        ctx.runtime
            .run(&ctx.toolchain.install(), self.location())
            .await
            .with_context(|| format!("Failed to install dependencies of \"{}\"", self.name()))
    }

    async fn compile<R: Runtime>(&self, ctx: &DeployContext<'_, R>, hierarchy: usize) -> Result<()> {
        info!("{}Compiling \"{}\"...", indent(hierarchy), self.name());
        ctx.runtime
            .run(&ctx.toolchain.compile(), self.location())
            .await
            .with_context(|| format!("Failed to compile \"{}\"", self.name()))
    }

    async fn publish<R: Runtime>(
        &self,
        ctx: &DeployContext<'_, R>,
        version: &str,
        hierarchy: usize,
    ) -> Result<()> {
        info!("{}Updating version to {}...", indent(hierarchy), version);
        ctx.runtime
            .run(&ctx.toolchain.set_version(version), self.location())
            .await
            .with_context(|| format!("Failed to set version of \"{}\"", self.name()))?;

        info!(
            "{}Publishing package \"{}\"...",
            indent(hierarchy),
            self.name()
        );
        ctx.runtime
            .run(&ctx.toolchain.publish(), self.location())
            .await
            .with_context(|| format!("Failed to publish \"{}\"", self.name()))?;

        // Give the registry time to index the package before dependents install it
        ctx.runtime.sleep(ctx.settle_delay).await;
        Ok(())
    }
}

//! Release orchestration across an ordered set of applications.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use super::graph::find_cycle;
use super::{Application, DeployContext, DeployError};
use crate::package::{PackageListing, VersionCheck};
use crate::runtime::Runtime;

/// Where a deployment run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStage {
    Idle,
    VersionValidated,
    ToolingInstalled,
    Tested,
    Aborted,
    PublishSkipped,
    Published,
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Stop after the test phase (dry run).
    pub skip_publishing: bool,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    PublishSkipped,
    Published,
}

/// An ordered release set rooted at the project whose version is bumped last.
#[derive(Debug)]
pub struct Deployment {
    root: PathBuf,
    applications: Vec<Application>,
    tests_failed: bool,
    failed_tests: Vec<String>,
    stage: DeploymentStage,
}

impl Deployment {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            applications: Vec::new(),
            tests_failed: false,
            failed_tests: Vec::new(),
            stage: DeploymentStage::Idle,
        }
    }

    /// Append an application; deployment follows insertion order.
    pub fn add_application(mut self, application: Application) -> Self {
        self.applications.push(application);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn stage(&self) -> DeploymentStage {
        self.stage
    }

    pub fn tests_failed(&self) -> bool {
        self.tests_failed
    }

    pub fn check_for_cycles(&self) -> Result<(), DeployError> {
        match find_cycle(&self.applications) {
            Some(cycle) => Err(DeployError::CyclicDependency(cycle)),
            None => Ok(()),
        }
    }

    /// Validate, install, test and publish every application at `version`.
    ///
    /// A deployment runs once; any error leaves it in [`DeploymentStage::Aborted`].
    pub async fn deploy<R: Runtime>(
        &mut self,
        ctx: &DeployContext<'_, R>,
        version: &str,
        options: &DeployOptions,
    ) -> Result<DeployOutcome> {
        if self.stage != DeploymentStage::Idle {
            return Err(DeployError::AlreadyRun.into());
        }

        let result = self.run_phases(ctx, version, options).await;
        if result.is_err() {
            self.advance(DeploymentStage::Aborted);
        }
        result
    }

    async fn run_phases<R: Runtime>(
        &mut self,
        ctx: &DeployContext<'_, R>,
        version: &str,
        options: &DeployOptions,
    ) -> Result<DeployOutcome> {
        self.check_for_cycles()?;
        self.check_version_is_valid(ctx, version).await?;
        self.advance(DeploymentStage::VersionValidated);

        for application in &self.applications {
            application.install_required_packages(ctx).await?;
        }
        self.advance(DeploymentStage::ToolingInstalled);

        for application in &self.applications {
            if let Err(e) = application.run_tests(ctx).await {
                error!("{:#}", e);
                self.tests_failed = true;
                self.failed_tests.push(application.name().to_string());
            }
        }
        if self.tests_failed {
            return Err(DeployError::TestsFailed(self.failed_tests.clone()).into());
        }
        self.advance(DeploymentStage::Tested);

        if options.skip_publishing {
            info!("The option skip_publishing was passed, so skipping publishing.");
            self.advance(DeploymentStage::PublishSkipped);
            return Ok(DeployOutcome::PublishSkipped);
        }

        for application in &self.applications {
            if application.is_deployed() {
                warn!(
                    "Application \"{}\" was already deployed to handle a dependency! Skipping it...",
                    application.name()
                );
                continue;
            }
            application.deploy(ctx, version, 0).await?;
        }

        ctx.runtime
            .run(&ctx.toolchain.set_version(version), &self.root)
            .await
            .context("Failed to update the root project version")?;

        self.advance(DeploymentStage::Published);
        Ok(DeployOutcome::Published)
    }

    async fn check_version_is_valid<R: Runtime>(
        &self,
        ctx: &DeployContext<'_, R>,
        version: &str,
    ) -> Result<()> {
        VersionCheck::parse(version)?;

        let listing = ctx
            .runtime
            .output(&ctx.toolchain.list(), &self.root)
            .await
            .context("Unable to determine the current version of the project.")?;
        let listing = PackageListing::parse(&listing)?;
        debug!(
            "Root project dependencies: {:?}",
            listing.dependency_versions()
        );

        info!(
            "Current version \"{}\" upgrading to \"{}\"!",
            listing.version, version
        );
        VersionCheck::check_upgrade(&listing.version, version)?;
        Ok(())
    }

    fn advance(&mut self, stage: DeploymentStage) {
        debug!("Deployment stage: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::Toolchain;
    use crate::package::{VersionComponent, VersionError};
    use crate::test_utils::{entries, recording_runtime, test_toolchain};
    use std::time::Duration;

    fn ctx<'a, R: Runtime>(runtime: &'a R, toolchain: &'a Toolchain) -> DeployContext<'a, R> {
        DeployContext {
            runtime,
            toolchain,
            settle_delay: Duration::from_millis(10),
        }
    }

    fn app(name: &str, tests: bool) -> Application {
        Application::new(name, format!("/work/{name}"), tests)
    }

    /// random, logger, api (tests, depends on logger)
    fn release_set() -> Deployment {
        let random = app("random", false);
        let logger = app("logger", false);
        let api = app("api", true).depends_on(&logger);
        Deployment::new("/work")
            .add_application(random)
            .add_application(logger)
            .add_application(api)
    }

    fn publishes(log: &[String]) -> Vec<&str> {
        log.iter()
            .filter(|e| e.ends_with("npm publish --access public"))
            .map(|e| e.split(':').next().unwrap_or_default())
            .collect()
    }

    #[test_log::test(tokio::test)]
    async fn test_full_deployment_order() {
        let (runtime, log) = recording_runtime("1.2.3", &[]);
        let toolchain = test_toolchain();
        let mut deployment = release_set();

        let outcome = deployment
            .deploy(&ctx(&runtime, &toolchain), "1.3.0", &DeployOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome, DeployOutcome::Published);
        assert_eq!(deployment.stage(), DeploymentStage::Published);
        assert!(deployment.applications().iter().all(|a| a.is_deployed()));

        let log = entries(&log);
        assert_eq!(log[0], "work: npm list --json");
        assert_eq!(log.last().unwrap(), "work: npm version 1.3.0");
        assert_eq!(publishes(&log), vec!["random", "logger", "api"]);

        // Every install happens before any test, every test before any publish
        let last_install = log.iter().rposition(|e| e.contains("install -D")).unwrap();
        let test = log.iter().position(|e| e == "api: npx jest").unwrap();
        let first_compile = log.iter().position(|e| e.ends_with("npx tsc")).unwrap();
        assert!(last_install < test);
        assert!(test < first_compile);
    }

    #[test_log::test(tokio::test)]
    async fn test_dependency_listed_after_dependent_is_deployed_first() {
        let (runtime, log) = recording_runtime("1.2.3", &[]);
        let toolchain = test_toolchain();
        let logger = app("logger", false);
        let api = app("api", false).depends_on(&logger);
        let mut deployment = Deployment::new("/work")
            .add_application(api)
            .add_application(logger);

        deployment
            .deploy(&ctx(&runtime, &toolchain), "1.2.4", &DeployOptions::default())
            .await
            .unwrap();

        // logger is deployed once, as api's dependency, then skipped in the main loop
        assert_eq!(publishes(&entries(&log)), vec!["logger", "api"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_shared_dependency_deployed_once() {
        let (runtime, log) = recording_runtime("1.2.3", &[]);
        let toolchain = test_toolchain();
        let logger = app("logger", false);
        let api = app("api", false).depends_on(&logger);
        let worker = app("worker", false).depends_on(&logger);
        let mut deployment = Deployment::new("/work")
            .add_application(api)
            .add_application(worker);

        deployment
            .deploy(&ctx(&runtime, &toolchain), "2.0.0", &DeployOptions::default())
            .await
            .unwrap();

        assert_eq!(publishes(&entries(&log)), vec!["logger", "api", "worker"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_tests_publish_nothing() {
        let (runtime, log) = recording_runtime("1.2.3", &["random: npx jest"]);
        let toolchain = test_toolchain();
        let mut deployment = Deployment::new("/work")
            .add_application(app("random", true))
            .add_application(app("api", true));

        let err = deployment
            .deploy(&ctx(&runtime, &toolchain), "1.3.0", &DeployOptions::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<DeployError>(),
            Some(&DeployError::TestsFailed(vec!["random".into()]))
        );
        assert!(deployment.tests_failed());
        assert_eq!(deployment.stage(), DeploymentStage::Aborted);

        let log = entries(&log);
        // The remaining application's tests still ran
        assert!(log.contains(&"api: npx jest".to_string()));
        assert!(publishes(&log).is_empty());
        assert!(!log.iter().any(|e| e.contains("npm version")));
    }

    #[test_log::test(tokio::test)]
    async fn test_skip_publishing() {
        let (runtime, log) = recording_runtime("1.2.3", &[]);
        let toolchain = test_toolchain();
        let mut deployment = release_set();

        let outcome = deployment
            .deploy(
                &ctx(&runtime, &toolchain),
                "1.3.0",
                &DeployOptions {
                    skip_publishing: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome, DeployOutcome::PublishSkipped);
        assert_eq!(deployment.stage(), DeploymentStage::PublishSkipped);
        let log = entries(&log);
        assert!(log.contains(&"api: npx jest".to_string()));
        assert!(publishes(&log).is_empty());
        assert!(!log.iter().any(|e| e.contains("npm version")));
        assert!(deployment.applications().iter().all(|a| !a.is_deployed()));
    }

    #[test_log::test(tokio::test)]
    async fn test_version_checks_before_any_install() {
        let cases = [
            ("1.2.3", None),
            ("1.1.0", Some(VersionComponent::Minor)),
            ("0.9.9", Some(VersionComponent::Major)),
            ("1.2.2", Some(VersionComponent::Patch)),
        ];

        for (requested, component) in cases {
            let (runtime, log) = recording_runtime("1.2.3", &[]);
            let toolchain = test_toolchain();
            let mut deployment = release_set();

            let err = deployment
                .deploy(&ctx(&runtime, &toolchain), requested, &DeployOptions::default())
                .await
                .unwrap_err();

            let version_err = err.downcast_ref::<VersionError>().unwrap();
            match component {
                None => assert_eq!(version_err, &VersionError::Same("1.2.3".into())),
                Some(expected) => assert!(matches!(
                    version_err,
                    VersionError::Regression { component, .. } if *component == expected
                )),
            }
            assert_eq!(entries(&log), vec!["work: npm list --json"]);
            assert_eq!(deployment.stage(), DeploymentStage::Aborted);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_malformed_version_runs_nothing() {
        let (runtime, log) = recording_runtime("1.2.3", &[]);
        let toolchain = test_toolchain();
        let mut deployment = release_set();

        let err = deployment
            .deploy(&ctx(&runtime, &toolchain), "1.3", &DeployOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<VersionError>(),
            Some(VersionError::Invalid(_))
        ));
        assert!(entries(&log).is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_padded_version_publishes_nothing() {
        for requested in [" 1.2.3", "1.2.3 "] {
            let (runtime, log) = recording_runtime("1.2.3", &[]);
            let toolchain = test_toolchain();
            let mut deployment = release_set();

            let err = deployment
                .deploy(&ctx(&runtime, &toolchain), requested, &DeployOptions::default())
                .await
                .unwrap_err();

            assert_eq!(
                err.downcast_ref::<VersionError>(),
                Some(&VersionError::Invalid(requested.to_string()))
            );
            assert!(entries(&log).is_empty());
            assert_eq!(deployment.stage(), DeploymentStage::Aborted);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_cycle_detected_before_any_command() {
        let (runtime, log) = recording_runtime("1.2.3", &[]);
        let toolchain = test_toolchain();
        let a = app("a", false);
        let b = app("b", false).depends_on(&a);
        a.add_dependency(&b);
        let mut deployment = Deployment::new("/work").add_application(a).add_application(b);

        let err = deployment
            .deploy(&ctx(&runtime, &toolchain), "2.0.0", &DeployOptions::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<DeployError>(),
            Some(&DeployError::CyclicDependency(vec![
                "a".into(),
                "b".into(),
                "a".into()
            ]))
        );
        assert!(entries(&log).is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_publish_failure_aborts_remaining() {
        let (runtime, log) =
            recording_runtime("1.2.3", &["logger: npm publish --access public"]);
        let toolchain = test_toolchain();
        let mut deployment = release_set();

        let err = deployment
            .deploy(&ctx(&runtime, &toolchain), "1.3.0", &DeployOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to publish \"logger\""));
        assert_eq!(deployment.stage(), DeploymentStage::Aborted);
        let log = entries(&log);
        // random was already published; nothing is rolled back
        assert!(log.contains(&"random: npm publish --access public".to_string()));
        assert!(!log.iter().any(|e| e.starts_with("api: npx tsc")));
        assert!(!log.contains(&"work: npm version 1.3.0".to_string()));
    }

    #[test_log::test(tokio::test)]
    async fn test_deployment_runs_once() {
        let (runtime, _log) = recording_runtime("1.2.3", &[]);
        let toolchain = test_toolchain();
        let mut deployment = release_set();
        let context = ctx(&runtime, &toolchain);

        deployment
            .deploy(&context, "1.3.0", &DeployOptions::default())
            .await
            .unwrap();
        let err = deployment
            .deploy(&context, "1.4.0", &DeployOptions::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<DeployError>(),
            Some(&DeployError::AlreadyRun)
        );
        assert_eq!(deployment.stage(), DeploymentStage::Published);
    }
}

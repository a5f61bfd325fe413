//! External tools invoked during a deployment.

use serde::Deserialize;

use crate::runtime::CommandLine;

fn default_package_manager() -> String {
    if cfg!(windows) {
        "npm.cmd".to_string()
    } else {
        "npm".to_string()
    }
}

fn default_package_runner() -> String {
    if cfg!(windows) {
        "npx.cmd".to_string()
    } else {
        "npx".to_string()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Package manager, runner and the commands built from them.
///
/// `test_command`, `compile_command` and `upgrade_command` are executed through
/// the package runner (`npx jest`, `npx tsc`, `npx ncu -u`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Toolchain {
    pub package_manager: String,
    pub package_runner: String,
    /// Development packages every application needs to build and publish.
    pub tooling: Vec<String>,
    /// Development packages installed only for applications that run tests.
    pub test_tooling: Vec<String>,
    pub test_command: Vec<String>,
    pub compile_command: Vec<String>,
    pub upgrade_command: Vec<String>,
    pub publish_args: Vec<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            package_manager: default_package_manager(),
            package_runner: default_package_runner(),
            tooling: strings(&["typescript", "npm-check-updates"]),
            test_tooling: strings(&["jest", "ts-jest", "@types/jest"]),
            test_command: strings(&["jest"]),
            compile_command: strings(&["tsc"]),
            upgrade_command: strings(&["ncu", "-u"]),
            publish_args: strings(&["--access", "public"]),
        }
    }
}

impl Toolchain {
    fn manager(&self) -> CommandLine {
        CommandLine::new(&self.package_manager)
    }

    fn runner(&self, command: &[String]) -> CommandLine {
        CommandLine::new(&self.package_runner).args(command.iter().cloned())
    }

    /// Dependency listing as JSON.
    pub fn list(&self) -> CommandLine {
        self.manager().args(["list", "--json"])
    }

    pub fn install(&self) -> CommandLine {
        self.manager().arg("install")
    }

    /// Install development packages.
    pub fn install_dev<I, S>(&self, packages: I) -> CommandLine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manager().args(["install", "-D"]).args(packages)
    }

    pub fn test(&self) -> CommandLine {
        self.runner(&self.test_command)
    }

    pub fn compile(&self) -> CommandLine {
        self.runner(&self.compile_command)
    }

    pub fn upgrade_dependencies(&self) -> CommandLine {
        self.runner(&self.upgrade_command)
    }

    pub fn set_version(&self, version: &str) -> CommandLine {
        self.manager().args(["version", version])
    }

    pub fn publish(&self) -> CommandLine {
        self.manager()
            .arg("publish")
            .args(self.publish_args.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix_toolchain() -> Toolchain {
        Toolchain {
            package_manager: "npm".into(),
            package_runner: "npx".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_commands() {
        let t = unix_toolchain();
        assert_eq!(t.list().to_string(), "npm list --json");
        assert_eq!(t.install().to_string(), "npm install");
        assert_eq!(
            t.install_dev(["typescript"]).to_string(),
            "npm install -D typescript"
        );
        assert_eq!(t.test().to_string(), "npx jest");
        assert_eq!(t.compile().to_string(), "npx tsc");
        assert_eq!(t.upgrade_dependencies().to_string(), "npx ncu -u");
        assert_eq!(t.set_version("1.2.3").to_string(), "npm version 1.2.3");
        assert_eq!(t.publish().to_string(), "npm publish --access public");
    }

    #[test]
    fn test_install_dev_many_packages() {
        let t = unix_toolchain();
        assert_eq!(
            t.install_dev(t.test_tooling.iter().cloned()).to_string(),
            "npm install -D jest ts-jest @types/jest"
        );
    }

    #[test]
    fn test_platform_default_manager() {
        let t = Toolchain::default();
        if cfg!(windows) {
            assert_eq!(t.package_manager, "npm.cmd");
        } else {
            assert_eq!(t.package_manager, "npm");
        }
    }
}

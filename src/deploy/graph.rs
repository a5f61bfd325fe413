//! Cycle detection over declared application dependencies.

use std::collections::HashMap;

use super::Application;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Find a dependency cycle reachable from `roots`.
///
/// Returns the application names along the cycle, starting and ending with the
/// same application (e.g. `["api", "logger", "api"]`).
pub fn find_cycle(roots: &[Application]) -> Option<Vec<String>> {
    let mut marks = HashMap::new();
    let mut path = Vec::new();
    roots
        .iter()
        .find_map(|root| visit(root, &mut marks, &mut path))
}

fn visit(
    app: &Application,
    marks: &mut HashMap<usize, Mark>,
    path: &mut Vec<Application>,
) -> Option<Vec<String>> {
    match marks.get(&app.id()) {
        Some(Mark::Done) => return None,
        Some(Mark::Visiting) => {
            let start = path.iter().position(|a| a.same_as(app)).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..]
                .iter()
                .map(|a| a.name().to_string())
                .collect();
            cycle.push(app.name().to_string());
            return Some(cycle);
        }
        None => {}
    }

    marks.insert(app.id(), Mark::Visiting);
    path.push(app.clone());

    for dependency in app.dependencies() {
        if let Some(cycle) = visit(&dependency, marks, path) {
            return Some(cycle);
        }
    }

    path.pop();
    marks.insert(app.id(), Mark::Done);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str) -> Application {
        Application::new(name, format!("/work/{name}"), false)
    }

    #[test]
    fn test_acyclic_graph() {
        let core = app("core");
        let logger = app("logger").depends_on(&core);
        let api = app("api").depends_on(&logger).depends_on(&core);
        assert_eq!(find_cycle(&[api, logger, core]), None);
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(find_cycle(&[]), None);
    }

    #[test]
    fn test_self_dependency() {
        let a = app("a");
        a.add_dependency(&a);
        assert_eq!(find_cycle(&[a]), Some(vec!["a".into(), "a".into()]));
    }

    #[test]
    fn test_indirect_cycle_reports_path() {
        let a = app("a");
        let b = app("b");
        let c = app("c");
        a.add_dependency(&b);
        b.add_dependency(&c);
        c.add_dependency(&a);

        let random = app("random");
        assert_eq!(
            find_cycle(&[random, a]),
            Some(vec!["a".into(), "b".into(), "c".into(), "a".into()])
        );
    }

    #[test]
    fn test_cycle_not_including_root() {
        let a = app("a");
        let b = app("b");
        a.add_dependency(&b);
        b.add_dependency(&b);
        assert_eq!(find_cycle(&[a]), Some(vec!["b".into(), "b".into()]));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let shared = app("shared");
        let left = app("left").depends_on(&shared);
        let right = app("right").depends_on(&shared);
        let top = app("top").depends_on(&left).depends_on(&right);
        assert_eq!(find_cycle(&[top]), None);
    }
}

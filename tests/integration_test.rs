use tempfile::TempDir;
use typedeps::analysis::Analyzer;
use typedeps::config::{save_config, TypeDepsConfig};
use typedeps::errors::TypeDepsError;
use typedeps::report::format_report_as_text;
use typedeps::semantic::{SymbolId, SymbolKind, SymbolTable, TreeBindings};
use typedeps::snapshot::{write_unit, BoundTree, CompiledUnit};
use typedeps::syntax::{SyntaxKind, TreeBuilder};

struct Sandbox {
    symbols: SymbolTable,
    program: SymbolId,
    greeter: SymbolId,
    greet: SymbolId,
    local_g: SymbolId,
    console: SymbolId,
    write_line: SymbolId,
    string: SymbolId,
}

/// `App.Program` and `App.Greeter` in module `App`, plus the `System`
/// symbols they use.
fn setup_symbols() -> Sandbox {
    let mut symbols = SymbolTable::new();
    let global = symbols.add_global_namespace();
    let system = symbols.add_namespace("System", Some(global));
    let console = symbols.add_type("Console", SymbolKind::Class, Some(system), "System.Console");
    let write_line = symbols.add_member("WriteLine", SymbolKind::Method, console);
    let string = symbols.add_type("String", SymbolKind::Class, Some(system), "System.Runtime");
    let app = symbols.add_namespace("App", Some(global));
    let program = symbols.add_type("Program", SymbolKind::Class, Some(app), "App");
    let greeter = symbols.add_type("Greeter", SymbolKind::Class, Some(app), "App");
    let greet = symbols.add_member("Greet", SymbolKind::Method, greeter);
    let local_g = symbols.add_member("g", SymbolKind::Local, program);
    Sandbox {
        symbols,
        program,
        greeter,
        greet,
        local_g,
        console,
        write_line,
        string,
    }
}

/// `class Program { Main() { var g = new Greeter(); Console.WriteLine(g.Greet()); } }`
fn program_tree(s: &Sandbox) -> BoundTree {
    let mut bindings = TreeBindings::new();
    let mut b = TreeBuilder::new("Program.cs");
    let class = b.add(b.root(), SyntaxKind::ClassDeclaration, Some("Program"));
    bindings.declare(class, s.program);
    let main = b.add(class, SyntaxKind::MethodDeclaration, Some("Main"));
    let body = b.add(main, SyntaxKind::Block, None);

    let local = b.add(body, SyntaxKind::LocalDeclaration, Some("g"));
    b.add(local, SyntaxKind::InferredType, Some("var"));
    let creation = b.add(local, SyntaxKind::ObjectCreation, None);
    let greeter_ref = b.ident(creation, "Greeter");
    bindings.bind(greeter_ref, s.greeter);

    let stmt = b.add(body, SyntaxKind::ExpressionStatement, None);
    let call = b.add(stmt, SyntaxKind::Invocation, None);
    let access = b.add(call, SyntaxKind::MemberAccess, None);
    let console_ref = b.ident(access, "Console");
    bindings.bind(console_ref, s.console);
    let write_ref = b.ident(access, "WriteLine");
    bindings.bind(write_ref, s.write_line);
    let arg = b.add(call, SyntaxKind::Argument, None);
    let inner = b.add(arg, SyntaxKind::Invocation, None);
    let inner_access = b.add(inner, SyntaxKind::MemberAccess, None);
    // Locals belong to the enclosing type.
    let g_ref = b.ident(inner_access, "g");
    bindings.bind(g_ref, s.local_g);
    let greet_ref = b.ident(inner_access, "Greet");
    bindings.bind(greet_ref, s.greet);

    BoundTree {
        tree: b.build(),
        bindings,
    }
}

/// `class Greeter { String Greet() { return String...; } }`
fn greeter_tree(s: &Sandbox) -> BoundTree {
    let mut bindings = TreeBindings::new();
    let mut b = TreeBuilder::new("Greeter.cs");
    let class = b.add(b.root(), SyntaxKind::ClassDeclaration, Some("Greeter"));
    bindings.declare(class, s.greeter);
    let method = b.add(class, SyntaxKind::MethodDeclaration, Some("Greet"));
    let ret = b.ident(method, "String");
    bindings.bind(ret, s.string);
    let body = b.add(method, SyntaxKind::Block, None);
    let stmt = b.add(body, SyntaxKind::ReturnStatement, None);
    let string_ref = b.ident(stmt, "String");
    bindings.bind(string_ref, s.string);
    BoundTree {
        tree: b.build(),
        bindings,
    }
}

/// A class whose body mentions an identifier the binder could not resolve.
fn broken_tree(s: &Sandbox) -> BoundTree {
    let mut bindings = TreeBindings::new();
    let mut b = TreeBuilder::new("Broken.cs");
    let class = b.add(b.root(), SyntaxKind::ClassDeclaration, Some("Program"));
    bindings.declare(class, s.program);
    let ok = b.ident(class, "Console");
    bindings.bind(ok, s.console);
    b.ident(class, "Missing");
    BoundTree {
        tree: b.build(),
        bindings,
    }
}

fn setup_unit(with_broken: bool) -> CompiledUnit {
    let s = setup_symbols();
    let mut trees = vec![program_tree(&s)];
    if with_broken {
        trees.push(broken_tree(&s));
    }
    trees.push(greeter_tree(&s));
    CompiledUnit {
        module: "App".to_string(),
        references: vec!["System.Console".to_string(), "System.Runtime".to_string()],
        symbols: s.symbols,
        trees,
    }
}

#[test]
fn test_analyze_units_end_to_end() {
    let unit = setup_unit(false);
    let result = Analyzer::default().analyze_units(&[unit]).unwrap();

    assert_eq!(result.unit_count, 1);
    assert_eq!(result.tree_count, 2);
    assert!(result.failed_trees.is_empty());
    assert_eq!(result.edges.len(), 7);
    assert_eq!(result.report.total(), result.edges.len());

    let text = format_report_as_text(&result.report);
    let expected = "===== Summary of dependencies\n\
                    FROM: App.Program\n\
                    \x20    \t=>\t2\t\tApp.Greeter\n\
                    \x20    \t=>\t2\t\tSystem.Console\n\
                    \x20    \t=>\t1\t\tApp.Program\n\
                    FROM: App.Greeter\n\
                    \x20    \t=>\t2\t\tSystem.String\n";
    assert_eq!(text, expected);
}

#[test]
fn test_parallel_matches_sequential() {
    let units = vec![setup_unit(false), setup_unit(false)];
    let sequential = Analyzer::default().analyze_units(&units).unwrap();
    let parallel = Analyzer::new(TypeDepsConfig {
        parallel: true,
        ..TypeDepsConfig::default()
    })
    .analyze_units(&units)
    .unwrap();

    assert_eq!(parallel.edges, sequential.edges);
    assert_eq!(parallel.report, sequential.report);
}

#[test]
fn test_resolution_error_aborts_by_default() {
    let unit = setup_unit(true);
    let err = Analyzer::default().analyze_units(&[unit]).unwrap_err();
    match err {
        TypeDepsError::UnresolvedReference {
            identifier,
            location,
            ..
        } => {
            assert_eq!(identifier, "Missing");
            assert_eq!(location.file, "Broken.cs");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_continue_on_error_skips_whole_tree() {
    let unit = setup_unit(true);
    let analyzer = Analyzer::new(TypeDepsConfig {
        continue_on_error: true,
        ..TypeDepsConfig::default()
    });
    let result = analyzer.analyze_units(&[unit]).unwrap();

    assert_eq!(result.tree_count, 3);
    assert_eq!(result.failed_trees.len(), 1);
    assert_eq!(result.failed_trees[0].path, "Broken.cs");
    assert!(result.failed_trees[0].error.contains("Missing"));
    assert!(
        result.edges.iter().all(|e| e.location.file != "Broken.cs"),
        "edges found before the failure are dropped too"
    );
    assert_eq!(result.edges.len(), 7);
}

#[tokio::test]
async fn test_analyze_path_discovers_snapshots() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("units")).unwrap();
    write_unit(&dir.path().join("units/app.typedeps.json"), &setup_unit(false))
        .await
        .unwrap();
    write_unit(&dir.path().join("units/app.json"), &setup_unit(true))
        .await
        .unwrap();

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_path(dir.path()).await.unwrap();
    assert_eq!(result.unit_count, 1, "only *.typedeps.json files are picked up");
    assert_eq!(result.report.groups.len(), 2);
}

#[tokio::test]
async fn test_analyze_single_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anything.json");
    write_unit(&path, &setup_unit(false)).await.unwrap();

    let result = Analyzer::default().analyze_path(&path).await.unwrap();
    assert_eq!(result.edges.len(), 7);
}

#[tokio::test]
async fn test_analyze_empty_directory_fails() {
    let dir = TempDir::new().unwrap();
    let err = Analyzer::default().analyze_path(dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("no snapshot files found"));
}

#[tokio::test]
async fn test_open_reads_project_config() {
    let dir = TempDir::new().unwrap();
    save_config(
        dir.path(),
        &TypeDepsConfig {
            exclude_self_references: true,
            ..TypeDepsConfig::default()
        },
    )
    .unwrap();
    write_unit(&dir.path().join("app.typedeps.json"), &setup_unit(false))
        .await
        .unwrap();

    let analyzer = Analyzer::open(dir.path()).unwrap();
    assert!(analyzer.config().exclude_self_references);
    let result = analyzer.analyze_path(dir.path()).await.unwrap();
    assert!(result.report.group("App.Program").unwrap().targets.iter().all(|t| t.to != "App.Program"));
    assert_eq!(result.edges.len(), 7, "filters apply to the report, not the raw edges");
}

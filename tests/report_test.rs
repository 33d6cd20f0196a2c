use typedeps::report::*;
use typedeps::types::{
    DependencyReport, ReferenceEdge, SourceGroup, SourceLocation, TargetCount, TypeIdentity,
};

fn sample_report() -> DependencyReport {
    DependencyReport {
        groups: vec![
            SourceGroup {
                from: "NS1.A".to_string(),
                targets: vec![
                    TargetCount {
                        to: "NS2.B".to_string(),
                        count: 3,
                    },
                    TargetCount {
                        to: "NS1.C".to_string(),
                        count: 1,
                    },
                ],
            },
            SourceGroup {
                from: "NS1.C".to_string(),
                targets: vec![TargetCount {
                    to: "System".to_string(),
                    count: 2,
                }],
            },
        ],
    }
}

#[test]
fn test_text_report_layout() {
    let text = format_report_as_text(&sample_report());
    let expected = "===== Summary of dependencies\n\
                    FROM: NS1.A\n\
                    \x20    \t=>\t3\t\tNS2.B\n\
                    \x20    \t=>\t1\t\tNS1.C\n\
                    FROM: NS1.C\n\
                    \x20    \t=>\t2\t\tSystem\n";
    assert_eq!(text, expected);
}

#[test]
fn test_empty_report_prints_header_only() {
    let text = format_report_as_text(&DependencyReport::default());
    assert_eq!(text, format!("{SUMMARY_HEADER}\n"));
}

#[test]
fn test_json_report_parses_back() {
    let report = sample_report();
    let json = format_report_as_json(&report);
    let parsed: DependencyReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["groups"][0]["targets"][0]["count"], 3);
}

#[test]
fn test_edges_text_includes_location() {
    let edges = vec![ReferenceEdge {
        from: TypeIdentity::new("Program", "App", "App"),
        to: TypeIdentity::new("Console", "System", "System.Console"),
        location: SourceLocation {
            file: "Program.cs".to_string(),
            line: 9,
            column: 13,
        },
    }];
    assert_eq!(
        format_edges_as_text(&edges),
        "Program.cs:9:13\tApp.Program -> System.Console\n"
    );

    let value: serde_json::Value = serde_json::from_str(&format_edges_as_json(&edges)).unwrap();
    assert_eq!(value[0]["to"]["module_id"], "System.Console");
    assert_eq!(value[0]["location"]["line"], 9);
}

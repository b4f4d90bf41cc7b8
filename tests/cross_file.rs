//! Cross-file scenarios: the project index, batch checking, configuration
//! loading, and exit-code policy, end to end on real directories.

use std::fs;
use std::path::Path;

use framelint::{
    check_paths, exit_code, render, CancelToken, Code, Options, OutputFormat, ProjectIndex,
    Severity,
};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Schema in one file, annotated loader in a second, call site in a third.
fn seed_three_file_project(root: &Path) {
    write(
        root,
        "schemas.py",
        r#"
class UserSchema(BaseSchema):
    a = Column(type=int)
    b = Column(type=str)
"#,
    );
    write(
        root,
        "loaders.py",
        r#"
from schemas import UserSchema

def load() -> DataFrame[UserSchema]:
    ...
"#,
    );
    write(
        root,
        "pipeline.py",
        r#"
from loaders import load

x = load()
x["a"]
x["c"]
"#,
    );
}

#[test]
fn test_should_resolve_schema_across_three_files() {
    // arrange
    let temp = tempfile::tempdir().unwrap();
    seed_three_file_project(temp.path());

    // act
    let diags = check_paths(
        &[temp.path().to_path_buf()],
        &Options::default(),
        &CancelToken::new(),
    )
    .unwrap();

    // assert — one E001 in pipeline.py at the call-site access of "c"
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, Code::E001);
    assert!(diags[0].path.ends_with("pipeline.py"));
    assert_eq!(diags[0].line, 6);
    assert!(diags[0].message.contains("'c'"));
}

#[test]
fn test_should_degrade_silently_without_index() {
    // arrange
    let temp = tempfile::tempdir().unwrap();
    seed_three_file_project(temp.path());
    let options = Options {
        no_index: true,
        ..Options::default()
    };

    // act
    let diags = check_paths(&[temp.path().to_path_buf()], &options, &CancelToken::new()).unwrap();

    // assert — the cross-file annotation cannot resolve, so nothing fires
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
}

#[test]
fn test_should_order_diagnostics_across_files() {
    // arrange
    let temp = tempfile::tempdir().unwrap();
    write(
        temp.path(),
        "b_second.py",
        "df = read_csv(\"u.csv\", usecols=[\"a\"])\ndf[\"x\"]\n",
    );
    write(
        temp.path(),
        "a_first.py",
        "df = read_csv(\"u.csv\", usecols=[\"a\"])\ndf[\"y\"]\ndf[\"z\"]\n",
    );

    // act
    let diags = check_paths(
        &[temp.path().to_path_buf()],
        &Options::default(),
        &CancelToken::new(),
    )
    .unwrap();

    // assert — path-major, then line
    assert_eq!(diags.len(), 3);
    assert!(diags[0].path.ends_with("a_first.py"));
    assert_eq!(diags[0].line, 2);
    assert_eq!(diags[1].line, 3);
    assert!(diags[2].path.ends_with("b_second.py"));
}

#[test]
fn test_should_report_parse_error_and_keep_checking() {
    // arrange
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "bad.py", "def broken(:\n");
    write(
        temp.path(),
        "good.py",
        "df = read_csv(\"u.csv\", usecols=[\"a\"])\ndf[\"zzz\"]\n",
    );

    // act
    let diags = check_paths(
        &[temp.path().to_path_buf()],
        &Options::default(),
        &CancelToken::new(),
    )
    .unwrap();

    // assert — bad.py contributes exactly one PARSE-ERROR, good.py its E001
    let parse_errors: Vec<_> = diags.iter().filter(|d| d.code == Code::ParseError).collect();
    assert_eq!(parse_errors.len(), 1);
    assert!(parse_errors[0].path.ends_with("bad.py"));
    assert!(diags.iter().any(|d| d.code == Code::E001));
}

#[test]
fn test_should_load_options_from_pyproject() {
    // arrange
    let temp = tempfile::tempdir().unwrap();
    write(
        temp.path(),
        "pyproject.toml",
        "[tool.framelint]\n\"strict-ingest\" = true\n",
    );
    write(temp.path(), "app.py", "df = pd.read_csv(\"u.csv\")\n");

    // act
    let options = Options::from_pyproject(temp.path()).unwrap();
    let diags = check_paths(&[temp.path().to_path_buf()], &options, &CancelToken::new()).unwrap();

    // assert
    assert!(options.strict_ingest);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, Code::W001);
    assert_eq!(diags[0].severity, Severity::Warning);
}

#[test]
fn test_should_apply_exit_code_policy() {
    // arrange — warnings only
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "app.py", "df = pd.read_csv(\"u.csv\")\n");
    let options = Options {
        strict_ingest: true,
        ..Options::default()
    };

    // act
    let diags = check_paths(&[temp.path().to_path_buf()], &options, &CancelToken::new()).unwrap();

    // assert — non-strict runs tolerate warnings, strict ones do not
    assert_eq!(exit_code(&diags, false), 0);
    assert_eq!(exit_code(&diags, true), 1);

    // and suppressing warnings first leaves strict with nothing to flag
    let quiet = Options {
        strict_ingest: true,
        warnings: false,
        ..Options::default()
    };
    let none = check_paths(&[temp.path().to_path_buf()], &quiet, &CancelToken::new()).unwrap();
    assert_eq!(exit_code(&none, true), 0);
}

#[test]
fn test_should_render_batch_in_all_formats() {
    // arrange
    let temp = tempfile::tempdir().unwrap();
    write(
        temp.path(),
        "app.py",
        "df = read_csv(\"u.csv\", usecols=[\"a\"])\ndf[\"zzz\"]\n",
    );
    let diags = check_paths(
        &[temp.path().to_path_buf()],
        &Options::default(),
        &CancelToken::new(),
    )
    .unwrap();

    // act
    let text = render::render(&diags, OutputFormat::Text).unwrap();
    let json = render::render(&diags, OutputFormat::Json).unwrap();
    let github = render::render(&diags, OutputFormat::Github).unwrap();

    // assert
    assert!(text.contains(":2:1: error[E001]"));
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["code"], "E001");
    assert!(github.starts_with("::error file="));
}

#[test]
fn test_should_cancel_between_files() {
    // arrange
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "a.py", "x = 1\n");
    let cancel = CancelToken::new();
    cancel.cancel();

    // act
    let result = check_paths(&[temp.path().to_path_buf()], &Options::default(), &cancel);

    // assert
    assert!(result.is_err());
}

#[test]
fn test_should_reuse_index_snapshot() {
    // arrange
    let temp = tempfile::tempdir().unwrap();
    seed_three_file_project(temp.path());
    let (index, _) = ProjectIndex::build(temp.path());
    let bytes = index.to_bytes().unwrap();

    // act — a decoded snapshot serves lookups like the original
    let restored = ProjectIndex::from_bytes(&bytes).unwrap();

    // assert
    let schema = restored.schema("schemas", "UserSchema").unwrap();
    assert_eq!(schema.columns(), vec!["a", "b"]);
    let ret = restored.function_return_schema("loaders", "load").unwrap();
    assert_eq!(ret.name(), "UserSchema");
}

//! Subcommand handlers against manifests in scratch directories.

use std::path::{Path, PathBuf};

use mdgen_cli::generate::{run_generate, GenerateArgs};
use mdgen_cli::schema::{sha256_hex, SchemaArgs};
use mdgen_cli::types::{run_types, TypesArgs};
use mdgen_cli::verify::{run_verify, VerifyArgs};

const MANIFEST: &str = r#"
package: model
roots: [Root]
patterns:
  patternNoAsterisk: '"^[^*]*$"'
types:
  - name: Root
    fields:
      - { name: Name, type: nullable.String, tag: 'json:"name" validate:"required,pattern=patternNoAsterisk"' }
      - { name: Tags, type: "[]Tag", tag: 'json:"tags"' }
  - name: Tag
    fields:
      - { name: Key, type: nullable.String, tag: 'json:"key" validate:"maxLength=1024"' }
"#;

fn write_manifest(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("schema.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

fn schema_args(path: PathBuf) -> SchemaArgs {
    SchemaArgs {
        schema: path,
        package: None,
        roots: vec![],
    }
}

#[test]
fn generate_writes_file_and_creates_parents() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("model_generated.go");
    let args = GenerateArgs {
        schema: schema_args(write_manifest(dir.path(), MANIFEST)),
        out: Some(out.clone()),
    };
    assert_eq!(run_generate(&args).unwrap(), 0);

    let code = std::fs::read_to_string(&out).unwrap();
    assert!(code.starts_with("// Code generated by \"mdgen\". DO NOT EDIT.\n\npackage model\n"));
    assert!(code.contains("\tpatternNoAsteriskRegexp = regexp.MustCompile(patternNoAsterisk)\n"));
    assert!(code.contains("func (val *Tag) validate() error {\n\tif !val.IsSet() {"));
}

#[test]
fn verify_detects_up_to_date_and_stale_files() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let out = dir.path().join("model_generated.go");
    let generate = GenerateArgs {
        schema: schema_args(manifest.clone()),
        out: Some(out.clone()),
    };
    run_generate(&generate).unwrap();

    let verify = VerifyArgs {
        schema: schema_args(manifest),
        out: out.clone(),
    };
    assert_eq!(run_verify(&verify).unwrap(), 0);

    let mut edited = std::fs::read_to_string(&out).unwrap();
    edited.push_str("\n// hand edit\n");
    std::fs::write(&out, &edited).unwrap();
    assert_eq!(run_verify(&verify).unwrap(), 1);
}

#[test]
fn regenerating_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let first = dir.path().join("a.go");
    let second = dir.path().join("b.go");
    for out in [&first, &second] {
        let args = GenerateArgs {
            schema: schema_args(manifest.clone()),
            out: Some(out.clone()),
        };
        run_generate(&args).unwrap();
    }
    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(sha256_hex(&a), sha256_hex(&b));
}

#[test]
fn verify_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let verify = VerifyArgs {
        schema: schema_args(write_manifest(dir.path(), MANIFEST)),
        out: dir.path().join("absent.go"),
    };
    let err = run_verify(&verify).unwrap_err();
    assert!(format!("{err:#}").contains("absent.go"));
}

#[test]
fn unknown_root_override_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut schema = schema_args(write_manifest(dir.path(), MANIFEST));
    schema.roots = vec!["Ghost".into()];
    let args = TypesArgs { schema, json: false };
    let err = run_types(&args).unwrap_err();
    assert!(format!("{err:#}").contains("object with root key Ghost not found"));
}

#[test]
fn generation_error_leaves_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let broken = MANIFEST.replace("maxLength=1024", "maxLength=lots");
    let out = dir.path().join("model_generated.go");
    let args = GenerateArgs {
        schema: schema_args(write_manifest(dir.path(), &broken)),
        out: Some(out.clone()),
    };
    let err = run_generate(&args).unwrap_err();
    assert!(format!("{err:#}").contains("'tags.key'"), "{err:#}");
    assert!(!out.exists());
}

use std::fs;
use std::path::Path;
use std::sync::Arc;

use mycnf::cli::{run, Command};
use mycnf::config::{set_global_config, Config};
use mycnf::encoding::FixedEncoding;
use mycnf::{ConfigModel, FieldValue, MycnfError, PlaceholderContext, Schema};
use serial_test::serial;

const SCHEMA: &str = r#"
[[section]]
name = "client"
required = true

[[section.field]]
key = "port"
type = "number"
default = 3306

[[section]]
name = "mysql"
required = true

[[section.field]]
key = "no-beep"
type = "raw"
default = "no-beep"
required = false

[[section]]
name = "mysqld"
required = true

[[section.field]]
key = "port"
type = "number"
default = 0
required = false

[[section.field]]
key = "basedir"
type = "path"
default = "%AppDir%"

[[section.field]]
key = "character-set-server"
type = "select"
options = ["utf8mb4", "latin1"]
default = "utf8mb4"
required = false

[[section.field]]
key = "sort_buffer_size"
type = "filesize"
default = "256K"
min = "32K"
max = "%TotalRAM%"
required = false
"#;

fn schema(app_dir: &Path) -> Arc<Schema> {
    let context = PlaceholderContext::new(app_dir, 16 * 1024 * 1024 * 1024);
    Arc::new(Schema::from_toml_str(SCHEMA, &context).unwrap())
}

fn write(path: &Path, text: &str) {
    fs::write(path, text).unwrap();
}

#[test]
fn test_save_then_load_keeps_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    write(
        &path,
        "[mysqld]\nport = 3307\nsort_buffer_size = 2M\n#character-set-server = latin1\nperformance_schema = OFF\n\n[mysqldump]\nquick\nmax_allowed_packet = 64M\n",
    );

    let mut first = ConfigModel::load(&path, schema(dir.path()));
    first.save().unwrap();
    let second = ConfigModel::load(&path, schema(dir.path()));

    for section in first.sections() {
        for entry in section.entries() {
            let again = second.get(section.name(), &entry.key).unwrap();
            assert_eq!(again.value, entry.value, "{}", entry.key);
            assert_eq!(again.active, entry.active, "{}", entry.key);
        }
    }
    assert_eq!(
        second.value("mysqld", "sort_buffer_size"),
        Some(FieldValue::Bytes(2 * 1024 * 1024))
    );
    assert!(!second.get("mysqld", "character-set-server").unwrap().active);
    assert_eq!(second.get("mysqldump", "max_allowed_packet").unwrap().value, "64M");
}

#[test]
fn test_disabling_a_key_comments_it_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    write(&path, "[mysqld]\nport = 3306\n");

    let mut model = ConfigModel::load(&path, schema(dir.path()));
    model.set_active("mysqld", "port", false).unwrap();
    model.save().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n#port = 3306\n"), "{}", text);
    assert!(text.contains("[client]\nport = 3306\n"), "{}", text);
}

#[test]
fn test_optional_defaults_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    write(&path, "[mysqld]\nsort_buffer_size = 256k\ncharacter-set-server = UTF8MB4\n");

    let mut model = ConfigModel::load(&path, schema(dir.path()));
    model.save().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("sort_buffer_size"), "{}", text);
    assert!(!text.contains("character-set-server"), "{}", text);
}

#[test]
fn test_app_dir_placeholder_resolves_to_absolute_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    let model = ConfigModel::load(&path, schema(Path::new("/opt/mysql")));

    assert_eq!(
        model.value("mysqld", "basedir"),
        Some(FieldValue::Path("/opt/mysql".to_string()))
    );
    let text = model.render();
    assert!(text.contains("basedir = /opt/mysql\n"), "{}", text);
}

#[test]
fn test_raw_line_is_only_written_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    write(&path, "[mysql]\nno-beep\n");

    let mut model = ConfigModel::load(&path, schema(dir.path()));
    assert!(model.render().contains("[mysql]\nno-beep\n"));

    assert!(!model.toggle_active("mysql", "no-beep").unwrap());
    model.save().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("no-beep"), "{}", text);
}

#[test]
fn test_fractional_size_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    write(&path, "[mysqld]\nsort_buffer_size = 1.5G\n");

    let mut model = ConfigModel::load(&path, schema(dir.path()));
    assert_eq!(
        model.value("mysqld", "sort_buffer_size"),
        Some(FieldValue::Bytes(256 * 1024))
    );
    model.save().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("= 1B"), "{}", text);
    assert!(!text.contains("sort_buffer_size"), "{}", text);
}

#[test]
fn test_include_directives_survive_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    write(
        &path,
        "!include /etc/mysql/common.cnf\n[mysqld]\nport=3306\n!includedir /etc/mysql/conf.d/\n[mysql]\n#no-beep\n",
    );

    let mut model = ConfigModel::load(&path, schema(dir.path()));
    model.set("mysqld", "port", "3307").unwrap();
    model.save().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("!include /etc/mysql/common.cnf\n\n[client]\n"), "{}", text);
    assert!(text.contains("!includedir /etc/mysql/conf.d/\n"), "{}", text);
    assert!(text.contains("[mysql]\n#no-beep\n"), "{}", text);

    // A second load and save leaves the directives untouched.
    let mut again = ConfigModel::load(&path, schema(dir.path()));
    again.set("mysqld", "port", "3308").unwrap();
    again.save().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("!includedir /etc/mysql/conf.d/").count(), 1);
    assert_eq!(text.matches("!include /etc/mysql/common.cnf").count(), 1);
}

#[test]
fn test_lookups_ignore_case() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    write(&path, "[MySQLd]\nPort = 3310\n");

    let model = ConfigModel::load(&path, schema(dir.path()));
    assert_eq!(model.get("mysqld", "PORT").unwrap().value, "3310");
    assert_eq!(model.value("MYSQLD", "port"), Some(FieldValue::Number(3310)));
}

#[test]
fn test_legacy_encoding_survives_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    let (bytes, _, _) =
        encoding_rs::WINDOWS_1252.encode("[mysqld]\nport = 3306\n[custom]\nowner = Jos\u{e9}\n");
    fs::write(&path, &bytes).unwrap();

    let detector = FixedEncoding(encoding_rs::WINDOWS_1252);
    let mut model = ConfigModel::load_with_detector(&path, schema(dir.path()), &detector);
    assert_eq!(model.get("custom", "owner").unwrap().value, "Jos\u{e9}");
    model.set("mysqld", "port", "3308").unwrap();
    model.save().unwrap();

    let saved = fs::read(&path).unwrap();
    assert!(saved.windows(4).any(|w| w == b"Jos\xe9"));
    assert!(std::str::from_utf8(&saved).is_err());
}

#[test]
fn test_failed_save_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the final rename fail.
    let path = dir.path().join("my.ini");
    fs::create_dir(&path).unwrap();

    let mut model = ConfigModel::load(&path, schema(dir.path()));
    model.set("mysqld", "port", "1").unwrap();
    let err = model.save().unwrap_err();
    assert!(matches!(err, MycnfError::Save(_)));
    assert!(err.to_string().starts_with("Failed to save configurations"));
    assert!(model.is_dirty());
    // No stray temporary files are left behind.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_builtin_schema_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let context = PlaceholderContext::new(dir.path(), 8 * 1024 * 1024 * 1024);
    let schema = Arc::new(Schema::builtin(&context).unwrap());
    let model = ConfigModel::load(dir.path().join("my.ini"), schema);

    assert_eq!(model.value("client", "port"), Some(FieldValue::Number(3306)));
    assert_eq!(
        model.value("mysqld", "datadir"),
        Some(FieldValue::Path(
            dir.path().join("data").to_string_lossy().into_owned()
        ))
    );
    let text = model.render();
    assert!(text.starts_with("[client]\n"), "{}", text);
}

fn quiet_config(path: &Path, schema_path: &Path) -> Config {
    let mut config = Config::default();
    config.quiet = true;
    config.ini_path = path.to_path_buf();
    config.schema_path = Some(schema_path.to_path_buf());
    config
}

#[test]
#[serial]
fn test_cli_set_and_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    let schema_path = dir.path().join("schema.toml");
    write(&schema_path, SCHEMA);
    write(&path, "[mysqld]\n#port = 3306\n");

    let config = quiet_config(&path, &schema_path);
    set_global_config(config.clone());

    run(
        Command::Set {
            section: "mysqld".to_string(),
            key: "port".to_string(),
            value: "3309".to_string(),
        },
        &config,
    )
    .unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\nport = 3309\n"), "{}", text);

    run(
        Command::Toggle {
            section: "mysqld".to_string(),
            key: "port".to_string(),
        },
        &config,
    )
    .unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n#port = 3309\n"), "{}", text);
}

#[test]
#[serial]
fn test_cli_rejects_invalid_value_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my.ini");
    let schema_path = dir.path().join("schema.toml");
    write(&schema_path, SCHEMA);
    write(&path, "[mysqld]\nsort_buffer_size = 1M\n");

    let config = quiet_config(&path, &schema_path);
    set_global_config(config.clone());

    let err = run(
        Command::Set {
            section: "mysqld".to_string(),
            key: "sort_buffer_size".to_string(),
            value: "1K".to_string(),
        },
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, MycnfError::InvalidValue { .. }));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[mysqld]\nsort_buffer_size = 1M\n"
    );
}

#[test]
#[serial]
fn test_cli_init_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh").join("my.ini");
    let schema_path = dir.path().join("schema.toml");
    write(&schema_path, SCHEMA);

    let config = quiet_config(&path, &schema_path);
    set_global_config(config.clone());

    run(Command::Init { force: true }, &config).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[client]\nport = 3306\n"), "{}", text);
}

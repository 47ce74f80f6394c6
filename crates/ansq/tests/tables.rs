//! Table tests
//!
//! Reads the files in /tests/fixtures/ through the public query interface. Paths are relative
//! to the crate directory, which is the working directory of `cargo test`.

use ansq::{AnsibleConfig, Query, Row, Table};
use pretty_assertions::assert_eq;
use std::path::Path;

const WEB_INI: &str = "tests/fixtures/inventory/web.ini";
const SITE_YML: &str = "tests/fixtures/playbooks/site.yml";

fn logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("ANSQ_LOG"))
        .with_writer(std::io::stderr)
        .try_init();
}

fn fixture_config() -> AnsibleConfig {
    AnsibleConfig::load_file(Path::new("tests/fixtures/ansible.hcl"), None)
        .expect("valid connection config")
}

fn rows(table: Table, path: &str) -> Vec<Row> {
    logging();
    let config = AnsibleConfig::default();
    Query::new(table, &config)
        .path(path)
        .rows()
        .expect("exact path needs no configuration")
        .collect::<ansq::Result<_>>()
        .expect("fixture parses")
}

#[test]
fn group_rows() {
    let groups = ansq::stream_groups(&AnsibleConfig::default(), Some(Path::new(WEB_INI)))
        .unwrap()
        .collect::<ansq::Result<Vec<_>>>()
        .unwrap();

    let names: Vec<_> = groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, vec!["all", "ungrouped", "web", "db"]);

    insta::assert_json_snapshot!(groups[3], @r###"
    {
      "name": "db",
      "hosts": [
        "h2"
      ],
      "parents": [
        "all",
        "web"
      ],
      "children": [],
      "vars": {
        "engine": "postgres"
      },
      "path": "tests/fixtures/inventory/web.ini"
    }
    "###);

    insta::assert_json_snapshot!(groups[2], @r###"
    {
      "name": "web",
      "hosts": [
        "h1",
        "h2"
      ],
      "parents": [
        "all"
      ],
      "children": [
        "db"
      ],
      "vars": {},
      "path": "tests/fixtures/inventory/web.ini"
    }
    "###);
}

#[test]
fn host_rows() {
    let hosts = rows(Table::Host, WEB_INI);
    assert_eq!(hosts.len(), 2);

    insta::assert_json_snapshot!(hosts[1], @r###"
    {
      "name": "h2",
      "port": 5432,
      "vars": {
        "engine": "postgres",
        "ansible_port": "5432"
      },
      "groups": [
        "all",
        "web",
        "db"
      ],
      "path": "tests/fixtures/inventory/web.ini"
    }
    "###);
}

#[test]
fn all_contains_every_host() {
    let config = fixture_config();
    let groups: Vec<_> = ansq::stream_groups(&config, None)
        .unwrap()
        .collect::<ansq::Result<_>>()
        .unwrap();

    let lab_all = &groups[0];
    assert_eq!(lab_all.path, "tests/fixtures/inventory/lab.ini");
    assert_eq!(lab_all.name, "all");
    assert_eq!(lab_all.hosts, vec!["lab1", "lab2"]);

    let lab_ungrouped = &groups[1];
    assert_eq!(lab_ungrouped.hosts, vec!["lab1", "lab2"]);

    let web_all = groups
        .iter()
        .find(|group| group.name == "all" && group.path == WEB_INI)
        .unwrap();
    assert_eq!(web_all.hosts, vec!["h1", "h2"]);
}

#[test]
fn deploy_task() {
    let tasks: Vec<_> = rows(Table::Task, SITE_YML)
        .into_iter()
        .filter_map(|row| match row {
            Row::Task(task) => Some(task),
            _ => None,
        })
        .collect();

    assert_eq!(tasks.len(), 2);

    let deploy: Vec<_> = tasks
        .iter()
        .filter(|task| task.playbook_name == "deploy")
        .collect();
    assert_eq!(deploy.len(), 1);
    assert_eq!(deploy[0].task.name, "restart service");
    assert_eq!(deploy[0].path, SITE_YML);
    assert_eq!(deploy[0].play_index, 1);
    assert_eq!(deploy[0].task.tags, Some(vec!["deploy".to_string()]));
    assert_eq!(
        deploy[0].task.notify,
        Some(ansq::value::Value::from("reload"))
    );
}

#[test]
fn playbook_rows() {
    let plays = rows(Table::Playbook, SITE_YML);
    assert_eq!(plays.len(), 2);

    let json = serde_json::to_value(&plays[1]).unwrap();
    assert_eq!(json["name"], "deploy");
    assert_eq!(json["hosts"], "web");
    assert_eq!(json["become"], true);
    assert_eq!(json["serial"], 1);
    assert_eq!(json["vars"], serde_json::json!({"version": "1.2.3"}));
    assert_eq!(json["tasks"][0]["service"]["state"], "restarted");
    assert_eq!(json["roles"], serde_json::Value::Null);
    assert_eq!(json["path"], SITE_YML);
}

#[test]
fn configured_globs() {
    let config = fixture_config();
    let paths: Vec<_> = Query::new(Table::Host, &config)
        .rows()
        .unwrap()
        .map(|row| match row.unwrap() {
            Row::Host(host) => (host.name, host.path),
            other => panic!("expected a host row, got {other:?}"),
        })
        .collect();

    assert_eq!(
        paths,
        vec![
            ("lab1".into(), "tests/fixtures/inventory/lab.ini".into()),
            ("lab2".into(), "tests/fixtures/inventory/lab.ini".into()),
            ("h1".into(), WEB_INI.into()),
            ("h2".into(), WEB_INI.into()),
        ]
    );
}

#[test]
fn exact_path_only_returns_that_path() {
    let hosts = rows(Table::Host, WEB_INI);
    assert!(hosts.iter().all(|row| match row {
        Row::Host(host) => host.path == WEB_INI,
        _ => false,
    }));
}

#[test]
fn parsing_is_deterministic() {
    assert_eq!(rows(Table::Group, WEB_INI), rows(Table::Group, WEB_INI));
    assert_eq!(rows(Table::Task, SITE_YML), rows(Table::Task, SITE_YML));
}

#[test]
fn unconfigured_connection() {
    let config = AnsibleConfig::load_file(Path::new("tests/fixtures/ansible.hcl"), Some("empty"))
        .unwrap();

    let err = Query::new(Table::Playbook, &config).rows().err().unwrap();
    assert!(err.is_configuration());
    assert_eq!(err.to_string(), "playbook_file_paths must be configured");

    let err = ansq::stream_hosts(&config, None).err().unwrap();
    assert_eq!(err.to_string(), "inventory_file_paths must be configured");
}

#[test]
fn directories_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.yml"), "- name: only\n").unwrap();
    std::fs::create_dir(dir.path().join("b.yml")).unwrap();

    let config = AnsibleConfig {
        playbook_file_paths: Some(vec![format!("{}/*.yml", dir.path().display())]),
        ..Default::default()
    };

    let plays: Vec<_> = ansq::stream_playbooks(&config, None)
        .unwrap()
        .collect::<ansq::Result<_>>()
        .unwrap();

    assert_eq!(plays.len(), 1);
    assert_eq!(plays[0].play.name, "only");
    assert!(plays[0].path.ends_with("a.yml"));
}

#[test]
fn parse_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yml");
    std::fs::write(&path, "- hosts: all\n  serial: 30%\n").unwrap();

    let config = AnsibleConfig::default();
    let mut rows = Query::new(Table::Playbook, &config)
        .path(&path)
        .rows()
        .unwrap();

    let err = rows.next().unwrap().unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.path(), Some(path.as_path()));
    assert!(err.to_string().starts_with("failed to unmarshal file content"));
    assert!(std::error::Error::source(&err).is_some());
    assert!(rows.next().is_none());
}

fn write_playbook(source: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.yml");
    std::fs::write(&path, source).unwrap();
    (dir, path)
}

#[test]
fn playbook_table_keeps_undecodable_tasks() {
    let (_dir, path) = write_playbook(
        "- name: deploy\n  tasks:\n    - name: loop it\n      debug: {msg: x}\n      loop: [1, 2]\n",
    );

    let plays = rows(Table::Playbook, path.to_str().unwrap());
    assert_eq!(plays.len(), 1);

    let json = serde_json::to_value(&plays[0]).unwrap();
    assert_eq!(json["name"], "deploy");
    assert_eq!(json["tasks"][0]["loop"], serde_json::json!([1, 2]));

    let config = AnsibleConfig::default();
    let err = Query::new(Table::Task, &config)
        .path(&path)
        .rows()
        .unwrap()
        .next()
        .unwrap()
        .unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn task_table_ignores_play_fields() {
    let (_dir, path) = write_playbook(
        "- name: deploy\n  tags: [web]\n  serial: 30%\n  tasks:\n    - name: restart service\n",
    );

    let tasks = rows(Table::Task, path.to_str().unwrap());
    assert_eq!(tasks.len(), 1);
    let Row::Task(task) = &tasks[0] else {
        panic!("expected a task row, got {:?}", tasks[0]);
    };
    assert_eq!(task.task.name, "restart service");
    assert_eq!(task.playbook_name, "deploy");
}

#[test]
fn empty_list_entries() {
    let (_dir, path) = write_playbook("- name: first\n-\n- name: third\n  tasks:\n    -\n");

    let plays = rows(Table::Playbook, path.to_str().unwrap());
    assert_eq!(plays.len(), 3);

    let tasks = rows(Table::Task, path.to_str().unwrap());
    assert_eq!(tasks.len(), 1);
    let Row::Task(task) = &tasks[0] else {
        panic!("expected a task row, got {:?}", tasks[0]);
    };
    assert_eq!(task.playbook_name, "third");
    assert_eq!(task.play_index, 2);
    assert_eq!(task.task.name, "");
}

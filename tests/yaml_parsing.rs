//! Integration tests for YAML parsing and validation

mod common;

use rask::config::{parse_config, validate_config, Run};
use rask::error::ConfigError;

#[test]
fn test_parse_complete_config() {
    let yaml = r#"
name: my-app
usage: My test application

options:
  environment:
    usage: Environment to target
    values: [staging, production]
    default: staging

tasks:
  build:
    usage: Build the project
    options:
      release:
        usage: Build in release mode
        type: bool
        short: r
    run:
      - command: cargo build

  test:
    usage: Run tests
    run: cargo test

  deploy:
    usage: Deploy the application
    run:
      - when:
          equal:
            environment: production
        command: echo "Deploying to production"
      - command: echo "Deployment complete"
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.name, Some("my-app".to_string()));
    assert_eq!(config.usage, Some("My test application".to_string()));
    assert_eq!(config.tasks.len(), 3);
    assert!(config.options.contains_key("environment"));

    let build = config.tasks.get("build").unwrap();
    assert_eq!(build.usage, Some("Build the project".to_string()));
    assert!(build.options.contains_key("release"));

    let deploy = config.tasks.get("deploy").unwrap();
    assert_eq!(deploy.run.len(), 2);
}

#[test]
fn test_parse_with_args_and_options() {
    let yaml = r#"
tasks:
  greet:
    usage: Greet someone
    args:
      person:
        usage: Person to greet
        required: true
    options:
      greeting:
        usage: Greeting to use
        default: Hello
    run: echo "${greeting}, ${person}!"
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    let task = config.tasks.get("greet").unwrap();
    assert!(task.args.contains_key("person"));
    assert!(task.options.contains_key("greeting"));
}

#[test]
fn test_parse_default_forms() {
    let yaml = r#"
tasks:
  mixed:
    options:
      bare:
        default: plain
      clause:
        default:
          value: single
      computed:
        default:
          command: date +%Y
      conditional:
        default:
          - when:
              os: linux
            value: Linux User
          - value: User
    run: echo "${bare}${clause}${computed}${conditional}"
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    let options = &config.tasks.get("mixed").unwrap().options;
    assert_eq!(options["bare"].default.len(), 1);
    assert_eq!(options["clause"].default.len(), 1);
    assert!(options["computed"].default[0].command.is_some());
    assert_eq!(options["conditional"].default.len(), 2);
    assert_eq!(options["conditional"].default[0].when[0].os, vec!["linux"]);
}

#[test]
fn test_parse_when_scalar_and_list_forms() {
    let yaml = r#"
tasks:
  conditional:
    run:
      - when:
          os: [linux, darwin]
          exists: file.txt
        command: echo "unix with file"
      - when:
          - command: which docker
          - environment:
              CI: "true"
        command: echo "docker under CI"
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    let task = config.tasks.get("conditional").unwrap();
    match &task.run[0] {
        Run::Complex(item) => {
            assert_eq!(item.when.len(), 1);
            assert_eq!(item.when[0].os.len(), 2);
            assert_eq!(item.when[0].exists, vec!["file.txt"]);
        }
        _ => panic!("expected a complex run item"),
    }
    match &task.run[1] {
        Run::Complex(item) => assert_eq!(item.when.len(), 2),
        _ => panic!("expected a complex run item"),
    }
}

#[test]
fn test_parse_subtasks() {
    let yaml = r#"
tasks:
  all:
    usage: Run everything
    run:
      - task: build
      - task:
          name: deploy
          options:
            environment: production

  build:
    run: echo "Building"

  deploy:
    options:
      environment:
        default: staging
    run: echo "Deploying to ${environment}"
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    let task = config.tasks.get("all").unwrap();
    assert_eq!(task.run.len(), 2);
}

#[test]
fn test_parse_finally_block() {
    let yaml = r#"
tasks:
  cleanup:
    run: echo "Running main task"
    finally:
      - echo "Cleaning up"
      - echo "Done"
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    let task = config.tasks.get("cleanup").unwrap();
    assert_eq!(task.run.len(), 1);
    assert_eq!(task.finally.len(), 2);
}

#[test]
fn test_parse_private_and_quiet() {
    let yaml = r#"
tasks:
  public:
    run: echo "public"
  hidden:
    private: true
    run: echo "hidden"
  hushed:
    quiet: true
    run: echo "hushed"
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    assert!(!config.tasks.get("public").unwrap().private);
    assert!(config.tasks.get("hidden").unwrap().private);
    assert!(config.tasks.get("hushed").unwrap().quiet);
}

#[test]
fn test_parse_from_file() {
    let yaml = r#"
tasks:
  hello:
    run: echo "Hello from file"
"#;

    let (_temp_dir, config_path) = common::create_test_config(yaml);
    let text = rask::config::read_config_text(&config_path).unwrap();
    let config = parse_config(&text).unwrap();

    validate_config(&config).unwrap();
    assert!(config.tasks.contains_key("hello"));
}

#[test]
fn test_invalid_multiple_actions() {
    let yaml = r#"
tasks:
  bad:
    run:
      - command: echo "hi"
        set-environment:
          FOO: bar
"#;

    let config = parse_config(yaml).unwrap();
    let result = validate_config(&config);
    assert!(matches!(result, Err(ConfigError::AmbiguousRunItem)));
}

#[test]
fn test_invalid_required_with_default() {
    let yaml = r#"
tasks:
  bad:
    options:
      target:
        required: true
        default: somewhere
    run: echo "${target}"
"#;

    let config = parse_config(yaml).unwrap();
    let result = validate_config(&config);
    assert!(matches!(result, Err(ConfigError::RequiredWithDefault(_))));
}

#[test]
fn test_invalid_duplicate_names() {
    let yaml = r#"
tasks:
  bad:
    args:
      name:
        required: true
    options:
      name:
        type: string
    run: echo "bad"
"#;

    let config = parse_config(yaml).unwrap();
    let result = validate_config(&config);
    assert!(matches!(result, Err(ConfigError::DuplicateNames(_))));
}

#[test]
fn test_tasks_preserve_declaration_order() {
    let yaml = r#"
tasks:
  third:
    run: echo 3
  first:
    run: echo 1
  second:
    run: echo 2
"#;

    let config = parse_config(yaml).unwrap();
    let names: Vec<&String> = config.tasks.keys().collect();
    assert_eq!(names, vec!["third", "first", "second"]);
}

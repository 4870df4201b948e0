//! Provider shapes, memoization, and failure modes on a single injector.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stratum_di::{
    arg, create_injector, token_of, Binding, Constructor, DepOp, Dependency, DiError,
    InjectionToken, Provider, Token,
};

struct Config {
    url: String,
}

struct Database {
    config: Arc<Config>,
}

fn config_value(url: &str) -> Provider {
    Binding::new(token_of::<Config>())
        .use_value(Config { url: url.into() })
        .into()
}

#[test]
fn value_provider_resolves_the_stored_value() {
    let injector = create_injector(vec![config_value("postgres://a")], None, None).unwrap();
    assert_eq!(injector.get::<Config>().unwrap().url, "postgres://a");
}

#[test]
fn constructor_provider_with_deps_builds_from_resolved_args() {
    let injector = create_injector(
        vec![
            config_value("postgres://b"),
            Binding::new(token_of::<Database>())
                .construct(Constructor::new::<Database, _>(vec![], |args| {
                    Ok(Database {
                        config: arg::<Config>(args, 0)?,
                    })
                }))
                .deps(vec![Dependency::Token(token_of::<Config>())])
                .into(),
        ],
        None,
        None,
    )
    .unwrap();

    let db = injector.get::<Database>().unwrap();
    assert_eq!(db.config.url, "postgres://b");

    // Second resolution returns the same instance, with the same Config
    // inside as a direct lookup of the dependency.
    let again = injector.get::<Database>().unwrap();
    assert!(Arc::ptr_eq(&db, &again));
    let config = injector.get::<Config>().unwrap();
    assert!(Arc::ptr_eq(&db.config, &config));
}

#[test]
fn factory_provider_runs_once_and_memoizes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in = calls.clone();
    let token: InjectionToken<String> = InjectionToken::new("greeting");

    let injector = create_injector(
        vec![Binding::new(token.token())
            .use_factory::<String, _>(move |_| {
                calls_in.fetch_add(1, Ordering::SeqCst);
                Ok("hello".to_string())
            })
            .into()],
        None,
        None,
    )
    .unwrap();

    let a = injector.get_injection(&token).unwrap();
    let b = injector.get_injection(&token).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn use_class_binds_a_token_to_another_constructor() {
    trait Repo: Send + Sync {
        fn kind(&self) -> &'static str;
    }
    struct PgRepo;
    impl Repo for PgRepo {
        fn kind(&self) -> &'static str {
            "pg"
        }
    }

    let token: InjectionToken<Box<dyn Repo>> = InjectionToken::new("repo");
    let injector = create_injector(
        vec![Binding::new(token.token())
            .use_class(Constructor::new::<Box<dyn Repo>, _>(vec![], |_| {
                Ok(Box::new(PgRepo) as Box<dyn Repo>)
            }))
            .deps(vec![])
            .into()],
        None,
        None,
    )
    .unwrap();

    assert_eq!(injector.get_injection(&token).unwrap().kind(), "pg");
}

#[test]
fn alias_reresolves_its_target_on_every_access() {
    let alias = Token::Tagged("db.alias");
    let injector = create_injector(
        vec![
            config_value("postgres://first"),
            Binding::new(alias.clone())
                .use_existing(token_of::<Config>())
                .into(),
        ],
        None,
        None,
    )
    .unwrap();

    assert_eq!(
        injector.get_token::<Config>(&alias).unwrap().url,
        "postgres://first"
    );

    // Rebinding the target rewrites its record in place; the alias picks the
    // new value up because it re-runs the lookup instead of caching.
    injector.register(config_value("postgres://second")).unwrap();
    assert_eq!(
        injector.get_token::<Config>(&alias).unwrap().url,
        "postgres://second"
    );
}

#[test]
fn empty_binding_fails_registration_with_unknown_shape() {
    let result = create_injector(
        vec![Binding::new(Token::Tagged("nothing")).into()],
        None,
        None,
    );
    assert!(matches!(result, Err(DiError::UnknownProviderShape(_))));
}

#[test]
fn missing_token_is_not_found() {
    #[derive(Debug)]
    struct Missing;
    let injector = create_injector(vec![], None, None).unwrap();
    match injector.get::<Missing>() {
        Err(DiError::NotFound(name)) => assert!(name.contains("Missing")),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn wrong_downcast_type_is_a_type_mismatch() {
    let token = Token::Tagged("number");
    let injector = create_injector(
        vec![Binding::new(token.clone()).use_value(42u32).into()],
        None,
        None,
    )
    .unwrap();
    assert!(matches!(
        injector.get_token::<String>(&token),
        Err(DiError::TypeMismatch(_))
    ));
}

#[test]
fn late_registration_rewrites_the_record_in_place() {
    let injector = create_injector(vec![config_value("postgres://old")], None, None).unwrap();
    assert_eq!(injector.get::<Config>().unwrap().url, "postgres://old");

    injector.register(config_value("postgres://new")).unwrap();
    assert_eq!(injector.get::<Config>().unwrap().url, "postgres://new");
}

#[test]
fn dependency_cycle_reports_the_path() {
    #[derive(Debug)]
    struct A;
    #[derive(Debug)]
    struct B;
    let injector = create_injector(
        vec![
            Binding::new(token_of::<A>())
                .construct(Constructor::new::<A, _>(vec![], |_| Ok(A)))
                .deps(vec![Dependency::Token(token_of::<B>())])
                .into(),
            Binding::new(token_of::<B>())
                .construct(Constructor::new::<B, _>(vec![], |_| Ok(B)))
                .deps(vec![Dependency::Token(token_of::<A>())])
                .into(),
        ],
        None,
        None,
    )
    .unwrap();

    match injector.get::<A>() {
        Err(DiError::Cyclic(path)) => {
            assert!(path.len() >= 3);
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected cycle, got {:?}", other),
    }
}

#[test]
fn optional_dep_op_substitutes_none() {
    struct Absent;
    struct Holder {
        found: bool,
    }

    let injector = create_injector(
        vec![Binding::new(token_of::<Holder>())
            .construct(Constructor::new::<Holder, _>(vec![], |args| {
                Ok(Holder {
                    found: stratum_di::arg_opt::<Absent>(args, 0)?.is_some(),
                })
            }))
            .deps(vec![Dependency::Ops(vec![
                DepOp::Optional,
                DepOp::Token(token_of::<Absent>()),
            ])])
            .into()],
        None,
        None,
    )
    .unwrap();

    assert!(!injector.get::<Holder>().unwrap().found);
}

#[test]
fn inject_dep_op_overrides_a_plain_token() {
    let real = Token::Tagged("real");
    let decoy = Token::Tagged("decoy");
    let out = Token::Tagged("out");

    let injector = create_injector(
        vec![
            Binding::new(real.clone()).use_value(10u32).into(),
            Binding::new(decoy.clone()).use_value(99u32).into(),
            Binding::new(out.clone())
                .use_factory::<u32, _>(|args| Ok(*arg::<u32>(args, 0)?))
                .deps(vec![Dependency::Ops(vec![
                    DepOp::Inject(real.clone()),
                    DepOp::Token(decoy.clone()),
                ])])
                .into(),
        ],
        None,
        None,
    )
    .unwrap();

    assert_eq!(*injector.get_token::<u32>(&out).unwrap(), 10);
}

#[test]
fn provider_groups_flatten_in_order() {
    let token = Token::Tagged("grouped");
    let injector = create_injector(
        vec![Provider::Group(vec![
            Binding::new(token.clone()).use_value(1u32).into(),
            Provider::Group(vec![Binding::new(token.clone()).use_value(2u32).into()]),
        ])],
        None,
        None,
    )
    .unwrap();

    // Later members of the flattened group win.
    assert_eq!(*injector.get_token::<u32>(&token).unwrap(), 2);
}

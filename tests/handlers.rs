//! Parameter-handler chains: modifier wrapping order, scope modifiers, and
//! handler replacement.

use std::sync::Arc;

use stratum_di::{
    arg, arg_opt, builtin_handler_providers, core_injector, create_injector, token_of, Binding,
    Constructor, DiError, ParamSpec, ParameterHandler, Provider, Token, OPTIONAL_HANDLER,
};

struct Config {
    name: &'static str,
}

fn config(name: &'static str) -> Provider {
    Binding::new(token_of::<Config>())
        .use_value(Config { name })
        .into()
}

// Local shadow: bare types always insert into the registering injector's
// own map rather than rewriting an ancestor record.
fn config_type(name: &'static str) -> Provider {
    Provider::Type(Constructor::new::<Config, _>(vec![], move |_| {
        Ok(Config { name })
    }))
}

#[test]
fn bare_types_resolve_their_params_through_the_chain() {
    struct Greeter;
    struct App {
        greeter: Arc<Greeter>,
    }

    let injector = core_injector(vec![
        Provider::Type(Constructor::new::<Greeter, _>(vec![], |_| Ok(Greeter))),
        Provider::Type(Constructor::new::<App, _>(
            vec![ParamSpec::of::<Greeter>()],
            |args| {
                Ok(App {
                    greeter: arg::<Greeter>(args, 0)?,
                })
            },
        )),
    ])
    .unwrap();

    let app = injector.get::<App>().unwrap();
    let greeter = injector.get::<Greeter>().unwrap();
    assert!(Arc::ptr_eq(&app.greeter, &greeter));
}

#[test]
fn missing_param_without_modifiers_fails_resolution() {
    struct Absent;
    struct App;

    let injector = core_injector(vec![Provider::Type(Constructor::new::<App, _>(
        vec![ParamSpec::of::<Absent>()],
        |_| Ok(App),
    ))])
    .unwrap();

    assert!(matches!(injector.get::<App>(), Err(DiError::NotFound(_))));
}

#[test]
fn optional_modifier_substitutes_none() {
    struct Absent;
    struct App {
        found: bool,
    }

    let injector = core_injector(vec![Provider::Type(Constructor::new::<App, _>(
        vec![ParamSpec::of::<Absent>().optional()],
        |args| {
            Ok(App {
                found: arg_opt::<Absent>(args, 0)?.is_some(),
            })
        },
    ))])
    .unwrap();

    assert!(!injector.get::<App>().unwrap().found);
}

#[test]
fn skip_self_resolves_past_a_local_shadow() {
    struct App {
        config: Arc<Config>,
    }

    let root = create_injector(
        {
            let mut providers = builtin_handler_providers();
            providers.push(config("root"));
            providers
        },
        Some("root"),
        None,
    )
    .unwrap();

    let child = create_injector(
        vec![
            config_type("child"),
            Provider::Type(Constructor::new::<App, _>(
                vec![ParamSpec::of::<Config>().skip_self()],
                |args| {
                    Ok(App {
                        config: arg::<Config>(args, 0)?,
                    })
                },
            )),
        ],
        Some("child"),
        Some(root),
    )
    .unwrap();

    // The plain lookup sees the shadow; the skip-self parameter does not.
    assert_eq!(child.get::<Config>().unwrap().name, "child");
    assert_eq!(child.get::<App>().unwrap().config.name, "root");
}

#[test]
fn skip_self_without_a_parent_is_an_error() {
    struct App;

    let root = create_injector(
        {
            let mut providers = builtin_handler_providers();
            providers.push(config("root"));
            providers.push(Provider::Type(Constructor::new::<App, _>(
                vec![ParamSpec::of::<Config>().skip_self()],
                |_| Ok(App),
            )));
            providers
        },
        Some("root"),
        None,
    )
    .unwrap();

    assert!(matches!(
        root.get::<App>(),
        Err(DiError::ParentNotFound(_))
    ));
}

#[test]
fn self_only_ignores_ancestor_bindings() {
    struct App {
        found: bool,
    }

    let root = create_injector(
        {
            let mut providers = builtin_handler_providers();
            providers.push(config("root"));
            providers
        },
        Some("root"),
        None,
    )
    .unwrap();

    // Config exists only in the root; optional+self-only yields None here.
    let child = create_injector(
        vec![Provider::Type(Constructor::new::<App, _>(
            vec![ParamSpec::of::<Config>().optional().self_only()],
            |args| {
                Ok(App {
                    found: arg_opt::<Config>(args, 0)?.is_some(),
                })
            },
        ))],
        Some("child"),
        Some(root),
    )
    .unwrap();

    assert!(!child.get::<App>().unwrap().found);
}

#[test]
fn inject_modifier_overrides_the_declared_token() {
    struct App {
        port: Arc<u16>,
    }
    let port = Token::Tagged("http.port");

    let injector = core_injector(vec![
        Binding::new(port.clone()).use_value(8080u16).into(),
        Provider::Type(Constructor::new::<App, _>(
            vec![ParamSpec::of::<u16>().inject(port)],
            |args| {
                Ok(App {
                    port: arg::<u16>(args, 0)?,
                })
            },
        )),
    ])
    .unwrap();

    assert_eq!(*injector.get::<App>().unwrap().port, 8080);
}

#[test]
fn first_listed_modifier_wraps_outermost() {
    struct App {
        found: bool,
    }
    let missing = Token::Tagged("missing.token");

    // Optional listed first wraps the failing inject lookup, so the failure
    // becomes a None substitution instead of an error.
    let injector = core_injector(vec![Provider::Type(Constructor::new::<App, _>(
        vec![ParamSpec::of::<Config>().optional().inject(missing)],
        |args| {
            Ok(App {
                found: arg_opt::<Config>(args, 0)?.is_some(),
            })
        },
    ))])
    .unwrap();

    assert!(!injector.get::<App>().unwrap().found);
}

#[test]
fn registered_handler_replaces_the_builtin_behavior() {
    struct Absent;
    struct App {
        found: bool,
    }

    let injector = core_injector(vec![Provider::Type(Constructor::new::<App, _>(
        vec![ParamSpec::of::<Absent>().optional()],
        |args| {
            Ok(App {
                found: arg_opt::<Absent>(args, 0)?.is_some(),
            })
        },
    ))])
    .unwrap();

    // Replace the optional handler with one that substitutes a real value
    // instead of None when the inner chain fails.
    injector
        .register(Provider::from(Binding::new(OPTIONAL_HANDLER).use_value(
            ParameterHandler::new(|injector, _request, next, default| {
                match next(injector, default) {
                    Ok(value) => Ok(value),
                    Err(_) => Ok(Some(Arc::new(Absent) as stratum_di::AnyArc)),
                }
            }),
        )))
        .unwrap();

    assert!(injector.get::<App>().unwrap().found);
}

#[test]
fn handlers_are_required_for_implicit_params() {
    struct Greeter;
    struct App;

    // Without the built-in handlers registered anywhere, implicit parameter
    // resolution cannot find the default handler.
    let injector = create_injector(
        vec![
            Provider::Type(Constructor::new::<Greeter, _>(vec![], |_| Ok(Greeter))),
            Provider::Type(Constructor::new::<App, _>(
                vec![ParamSpec::of::<Greeter>()],
                |_| Ok(App),
            )),
        ],
        None,
        None,
    )
    .unwrap();

    assert!(matches!(injector.get::<App>(), Err(DiError::NotFound(_))));
    // Param-less types still work fine.
    assert!(injector.get::<Greeter>().is_ok());
}

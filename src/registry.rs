//! The record builder: turns provider declarations into records.

use std::sync::Arc;

use crate::dependency::resolve_dependency;
use crate::error::{DiError, DiResult};
use crate::flags::InjectFlags;
use crate::handlers::resolve_parameters;
use crate::injector::Injector;
use crate::provider::{Binding, Constructor, Dependency, FactoryFn, Provider, Shape};
use crate::record::{AnyArc, Record, RecordFactory};

/// Registers one provider into an injector's record map.
///
/// Groups flatten recursively; bare types overwrite the local entry
/// unconditionally; bindings are classified, matched against any existing
/// record in the injector or its ancestors, and either chained (multi) or
/// rewritten in place, else inserted fresh into the local map.
pub(crate) fn register_provider(injector: &Injector, provider: Provider) -> DiResult<()> {
    match provider {
        Provider::Group(group) => {
            for member in group {
                register_provider(injector, member)?;
            }
            Ok(())
        }
        Provider::Type(ctor) => {
            // Bare types are not multi-aware: always a fresh local entry.
            let record = type_record(injector, &ctor);
            injector.insert_record(ctor.token().clone(), Arc::new(record));
            Ok(())
        }
        Provider::Bind(binding) => {
            // Validate the shape up front; multi factories re-classify lazily.
            binding.classify()?;

            let existing = injector.find_record(binding.provide());
            let record = if binding.multi {
                // Snapshot first: the chained factory must realize the
                // previous strategy, not the record it is about to replace.
                let prev = existing.as_ref().map(|r| r.snapshot());
                multi_record(injector, &binding, prev)
            } else {
                single_record(injector, &binding)?
            };

            match existing {
                // In-place rewrite: holders of the old record (anywhere in
                // the hierarchy) observe the new strategy.
                Some(live) => live.overwrite_with(record),
                None => injector.insert_record(binding.provide().clone(), Arc::new(record)),
            }
            Ok(())
        }
    }
}

/// Builds the non-multi record for a classified binding.
fn single_record(injector: &Injector, binding: &Binding) -> DiResult<Record> {
    let name = binding.provide().display_name();
    match binding.classify()? {
        Shape::Value(value) => Ok(Record::with_value(name, value.clone())),
        Shape::Class(ctor) => match &binding.deps {
            Some(deps) => Ok(construct_record(injector, name, ctor, deps)),
            None => Ok(type_record(injector, ctor)),
        },
        Shape::Factory(factory) => {
            let deps = binding.deps.clone().unwrap_or_default();
            Ok(Record::with_factory(
                name,
                deps_factory(injector, name, deps, factory.clone()),
            ))
        }
        Shape::Existing(target) => {
            // Aliases re-run the lookup on every access; caching is left to
            // the aliased record itself.
            let weak = injector.downgrade();
            let target = target.clone();
            Ok(Record::with_passthrough_factory(
                name,
                Arc::new(move || {
                    let injector = weak.upgrade().ok_or(DiError::InjectorDropped(name))?;
                    injector
                        .resolve(&target, None, InjectFlags::DEFAULT)?
                        .ok_or(DiError::NotFound(target.display_name()))
                }),
            ))
        }
        Shape::Ctor(ctor) => match &binding.deps {
            Some(deps) => Ok(construct_record(injector, name, ctor, deps)),
            None => Ok(type_record(injector, ctor)),
        },
    }
}

/// Record for a constructible type resolved through the parameter-handler
/// chain (bare types and `use_class`/constructor providers without `deps`).
fn type_record(injector: &Injector, ctor: &Constructor) -> Record {
    let weak = injector.downgrade();
    let ctor = ctor.clone();
    let name = ctor.token().display_name();
    Record::with_factory(
        name,
        Arc::new(move || {
            let injector = weak.upgrade().ok_or(DiError::InjectorDropped(name))?;
            let args = if ctor.params().is_empty() {
                Vec::new()
            } else {
                resolve_parameters(&injector, ctor.params())?
            };
            ctor.build(&args)
        }),
    )
}

/// Record for a constructor invoked with an explicit `deps` list.
fn construct_record(
    injector: &Injector,
    name: &'static str,
    ctor: &Constructor,
    deps: &[Dependency],
) -> Record {
    let weak = injector.downgrade();
    let ctor = ctor.clone();
    let deps = deps.to_vec();
    Record::with_factory(
        name,
        Arc::new(move || {
            let injector = weak.upgrade().ok_or(DiError::InjectorDropped(name))?;
            let args = deps
                .iter()
                .map(|dep| resolve_dependency(&injector, dep))
                .collect::<DiResult<Vec<_>>>()?;
            ctor.build(&args)
        }),
    )
}

/// Factory wrapper resolving `deps` in declared order before the call.
fn deps_factory(
    injector: &Injector,
    name: &'static str,
    deps: Vec<Dependency>,
    call: FactoryFn,
) -> RecordFactory {
    let weak = injector.downgrade();
    Arc::new(move || {
        let injector = weak.upgrade().ok_or(DiError::InjectorDropped(name))?;
        let args = deps
            .iter()
            .map(|dep| resolve_dependency(&injector, dep))
            .collect::<DiResult<Vec<_>>>()?;
        call(&args)
    })
}

/// Record accumulating a multi-binding sequence.
///
/// The factory realizes the current provider's own record, then the snapshot
/// of the previous record for the same token, and appends: previous entries
/// first, the most recently declared value last.
fn multi_record(injector: &Injector, binding: &Binding, prev: Option<Record>) -> Record {
    let weak = injector.downgrade();
    let binding = binding.clone();
    let name = binding.provide().display_name();
    let prev = prev.map(Arc::new);
    Record::with_factory(
        name,
        Arc::new(move || {
            let injector = weak.upgrade().ok_or(DiError::InjectorDropped(name))?;
            let current = single_record(&injector, &binding)?;
            let value = current.create()?;

            let mut sequence: Vec<AnyArc> = match &prev {
                Some(prev) => {
                    let realized = prev.create()?;
                    realized
                        .downcast::<Vec<AnyArc>>()
                        .map_err(|_| DiError::TypeMismatch(name))?
                        .as_ref()
                        .clone()
                }
                None => Vec::new(),
            };
            sequence.push(value);
            Ok(Arc::new(sequence) as AnyArc)
        }),
    )
}

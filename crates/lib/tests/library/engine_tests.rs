use std::cell::OnceCell;
use std::rc::Rc;

use purestack_lib::pure::{Builder, Context, JoinError, Scope, combine, join, wrap};

use super::common::Trace;

#[test]
fn declaring_runs_nothing() {
  let trace = Trace::new();
  let a = trace.resource("A");
  let b = a.chain({
    let trace = trace.clone();
    move |_| Ok(trace.resource("B"))
  });
  let _ctx = combine().field("a", &a).field("b", &b).build();
  let _eff = b.effect(|_, _| Ok(()));

  assert_eq!(trace.calls(), 0);
}

#[test]
fn shared_dependency_realized_once() {
  let trace = Trace::new();
  let base = trace.resource("Base");
  let left = base.map(|v| Ok(format!("{v}-left")));
  let right = base.map(|v| Ok(format!("{v}-right")));
  let top = combine().field("left", &left).field("right", &right).field("base", &base).build();

  let mut scope = Scope::new("stack");
  let ctx = join(&mut scope, &top).unwrap();

  assert_eq!(trace.calls(), 1);
  assert_eq!(*ctx.get::<String>("left").unwrap(), "Base-left");
  assert_eq!(*ctx.get::<String>("right").unwrap(), "Base-right");
  assert!(Rc::ptr_eq(
    &ctx.get::<String>("base").unwrap(),
    &scope.lookup::<String>("Base").unwrap()
  ));
}

#[test]
fn dependencies_realize_first() {
  let trace = Trace::new();
  let zone = trace.resource("Zone");
  let cert = zone.chain({
    let trace = trace.clone();
    move |_| Ok(trace.resource("Cert"))
  });
  let api = cert.chain({
    let trace = trace.clone();
    move |_| Ok(trace.resource("Api"))
  });

  let mut scope = Scope::new("stack");
  join(&mut scope, &api).unwrap();

  assert_eq!(trace.order(), ["Zone", "Cert", "Api"]);
}

#[test]
fn context_fields_realize_in_declaration_order() {
  let trace = Trace::new();
  let top = combine()
    .field("c", &trace.resource("C"))
    .field("a", &trace.resource("A"))
    .field("b", &trace.resource("B"))
    .build();

  let mut scope = Scope::new("stack");
  let ctx = join(&mut scope, &top).unwrap();

  assert_eq!(trace.order(), ["C", "A", "B"]);
  assert_eq!(ctx.names().collect::<Vec<_>>(), ["c", "a", "b"]);
}

#[test]
fn cycle_through_continuation_detected() {
  let trace = Trace::new();
  let slot: Rc<OnceCell<Builder<String>>> = Rc::new(OnceCell::new());
  let target = slot.clone();
  let back = Builder::defer(move || target.get().cloned().unwrap());
  let looped = trace.resource("Root").chain(move |_| Ok(back.clone())).map(|v| Ok(v.to_string()));
  slot.set(looped.clone()).unwrap();

  let base = trace.resource("Other");
  let top = combine().field("other", &base).field("looped", &looped).build();

  let mut scope = Scope::new("stack");
  let err = join(&mut scope, &top).unwrap_err();

  assert!(matches!(err, JoinError::CycleDetected { .. }));
}

#[test]
fn static_cycle_rejected_before_any_factory() {
  let trace = Trace::new();
  let slot: Rc<OnceCell<Builder<String>>> = Rc::new(OnceCell::new());
  let target = slot.clone();
  let back = Builder::defer(move || target.get().cloned().unwrap());
  let looped = combine().field("self", &back).field("root", &trace.resource("Root")).build();
  let named = looped.map(|ctx: &Context| Ok(format!("{} fields", ctx.len())));
  slot.set(named.clone()).unwrap();

  let mut scope = Scope::new("stack");
  let err = join(&mut scope, &named).unwrap_err();

  assert!(matches!(err, JoinError::CycleDetected { .. }));
  assert_eq!(trace.calls(), 0);
}

#[test]
fn duplicate_identity_rejected_before_any_factory() {
  let trace = Trace::new();
  let first = trace.resource("Role");
  let second = trace.resource("Role");
  let top = combine().field("first", &first).field("second", &second).build();

  let mut scope = Scope::new("stack");
  let err = join(&mut scope, &top).unwrap_err();

  assert!(matches!(err, JoinError::IdentityCollision { ref identity, .. } if identity == "Role"));
  assert_eq!(trace.calls(), 0);
}

#[test]
fn identity_produced_by_continuation_collides() {
  let trace = Trace::new();
  let first = trace.resource("Role");
  let second = trace.resource("Seed").chain({
    let trace = trace.clone();
    move |_| Ok(trace.resource("Role"))
  });
  let top = combine().field("first", &first).field("second", &second).build();

  let mut scope = Scope::new("stack");
  let err = join(&mut scope, &top).unwrap_err();

  assert!(matches!(err, JoinError::IdentityCollision { ref identity, .. } if identity == "Role"));
  assert_eq!(trace.order(), ["Role", "Seed"]);
}

#[test]
fn effects_run_after_inputs_in_order() {
  let trace = Trace::new();
  let top = combine()
    .field("zone", &trace.resource("Zone"))
    .field("api", &trace.resource("Api"))
    .build()
    .effect({
      let trace = trace.clone();
      move |_, ctx| {
        trace.order.borrow_mut().push(format!("first:{}", ctx.len()));
        Ok(1u32)
      }
    })
    .effect({
      let trace = trace.clone();
      move |_, n| {
        trace.order.borrow_mut().push(format!("second:{n}"));
        Ok(())
      }
    });

  let mut scope = Scope::new("stack");
  join(&mut scope, &top).unwrap();

  assert_eq!(trace.order(), ["Zone", "Api", "first:2", "second:1"]);
}

#[test]
fn effects_on_one_context_run_in_declaration_order() {
  let trace = Trace::new();
  let ctx = combine().field("zone", &trace.resource("Zone")).build();
  let declare = |label: &'static str| {
    let trace = trace.clone();
    ctx.effect(move |_, _| {
      trace.order.borrow_mut().push(label.to_string());
      Ok(())
    })
  };
  let first = declare("first-declared");
  let second = declare("second-declared");
  let top = combine().field("x", &second).field("y", &first).build();

  let mut scope = Scope::new("stack");
  join(&mut scope, &top).unwrap();

  assert_eq!(trace.order(), ["Zone", "first-declared", "second-declared"]);
}

#[test]
fn effect_failure_keeps_earlier_registrations() {
  let trace = Trace::new();
  let top = trace.resource("Zone").effect(|_, _| -> Result<(), _> { Err("route conflict".into()) });

  let mut scope = Scope::new("stack");
  let err = join(&mut scope, &top).unwrap_err();

  assert!(matches!(err, JoinError::Factory { .. }));
  assert!(err.to_string().contains("route conflict"));
  assert!(scope.contains("Zone"));
}

#[test]
fn adapter_shares_upstream_realization() {
  let trace = Trace::new();
  let func = trace.resource("Function");
  let integration = wrap(|name: &String| Ok(format!("integration:{name}")))(&func);
  let top = combine().field("func", &func).field("integration", &integration).build();

  let mut scope = Scope::new("stack");
  let ctx = join(&mut scope, &top).unwrap();

  assert_eq!(trace.calls(), 1);
  assert_eq!(*ctx.get::<String>("integration").unwrap(), "integration:Function");
}

#[test]
fn separate_scopes_realize_separately() {
  let trace = Trace::new();
  let shared = trace.resource("Shared");

  let mut first = Scope::new("first");
  let mut second = Scope::new("second");
  join(&mut first, &shared).unwrap();
  join(&mut second, &shared).unwrap();

  assert_eq!(trace.calls(), 2);
  assert!(matches!(
    join(&mut first, &shared).unwrap_err(),
    JoinError::AlreadyJoined { ref scope } if scope == "first"
  ));
}

#[test]
fn anonymous_identities_are_unique() {
  let top = combine()
    .field("a", &Builder::new(|_, id| Ok(id.to_string())))
    .field("b", &Builder::new(|_, id| Ok(id.to_string())))
    .build();

  let mut scope = Scope::new("stack");
  let ctx = join(&mut scope, &top).unwrap();

  let a = ctx.get::<String>("a").unwrap();
  let b = ctx.get::<String>("b").unwrap();
  assert_ne!(a, b);
  assert!(scope.contains(&a) && scope.contains(&b));
}

#[test]
fn generated_identities_never_shadow_explicit_ones() {
  let trace = Trace::new();
  let top = Builder::new(|_, id| Ok(id.to_string())).chain({
    let trace = trace.clone();
    move |_| Ok(trace.resource("Resource1"))
  });

  let mut scope = Scope::new("stack");
  assert_eq!(*join(&mut scope, &top).unwrap(), "Resource1");
  assert_eq!(trace.calls(), 1);
}

#[test]
fn explicit_identity_cannot_use_generated_marker() {
  let trace = Trace::new();
  let mut scope = Scope::new("stack");
  let err = join(&mut scope, &trace.resource("Resource#1")).unwrap_err();

  assert!(matches!(err, JoinError::ReservedIdentity { ref identity, .. } if identity == "Resource#1"));
  assert_eq!(trace.calls(), 0);
}

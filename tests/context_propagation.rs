//! Integration tests for context-data propagation
//!
//! These tests verify that contextual metadata flows down a call chain, never
//! collides with application keys and never leaks between sibling contexts.

mod common;

use ctxlog::context::Context;
use ctxlog::logging::{
    build_context_data_and_set_value, context_data, set_context_data_and_set_value, Carrier,
    ContextData, CONTEXT_DATA_MAP_KEY, CONTEXT_ID_KEY,
};
use std::collections::BTreeMap;
use std::sync::Arc;

mod collision_freedom {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct ThisKeyType(&'static str);

    #[test]
    fn test_no_collision_when_build_context_data() {
        let (logger, _) = common::memory_logger();
        let this_key = ThisKeyType(CONTEXT_DATA_MAP_KEY.as_str());
        let this_key_value = "muhammad_fakhri".to_string();
        let random_id = "randomID";

        let ctx = logger.build_context_data_and_set_value(random_id);
        let new_ctx = ctx.with_value(this_key, this_key_value.clone());

        assert_eq!(
            new_ctx.value::<_, String>(&ThisKeyType(CONTEXT_DATA_MAP_KEY.as_str())),
            Some(&this_key_value)
        );
        let data = context_data(&new_ctx).unwrap();
        assert_eq!(data[CONTEXT_ID_KEY], random_id);
    }

    #[test]
    fn test_bare_string_key_with_mapping_value_does_not_alias() {
        let ctx = build_context_data_and_set_value(&Context::background(), "r1");

        let mut forged = ContextData::new();
        forged.insert(CONTEXT_ID_KEY.to_string(), "forged".to_string());
        let ctx = ctx
            .with_value(CONTEXT_DATA_MAP_KEY.as_str(), forged.clone())
            .with_value(CONTEXT_DATA_MAP_KEY.to_string(), forged);

        assert_eq!(context_data(&ctx).unwrap()[CONTEXT_ID_KEY], "r1");
    }

    #[test]
    fn test_foreign_mapping_is_not_read_as_context_data() {
        let mut forged = ContextData::new();
        forged.insert(CONTEXT_ID_KEY.to_string(), "forged".to_string());
        let ctx = Context::background().with_value("context_data_map", forged);

        assert!(context_data(&ctx).is_none());
    }

    #[test]
    fn test_set_preserves_application_values() {
        let ctx = build_context_data_and_set_value(&Context::background(), "r1")
            .with_value(ThisKeyType(CONTEXT_DATA_MAP_KEY.as_str()), 42u64);

        let ctx = set_context_data_and_set_value(ctx, [("language", "en")], "r2");

        assert_eq!(
            ctx.value::<_, u64>(&ThisKeyType(CONTEXT_DATA_MAP_KEY.as_str())),
            Some(&42)
        );
        assert_eq!(context_data(&ctx).unwrap()[CONTEXT_ID_KEY], "r2");
    }
}

mod merge_semantics {
    use super::*;

    #[test]
    fn test_merge_precedence() {
        let (logger, _) = common::memory_logger();
        let ctx = logger.build_context_data_and_set_value("r1");

        let ctx = logger.set_context_data_and_set_value(
            ctx,
            [("http_method", "GET"), ("language", "en")],
            "r2",
        );

        let expected: BTreeMap<String, String> = [
            ("id", "r2"),
            ("http_method", "GET"),
            ("language", "en"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(*context_data(&ctx).unwrap(), expected);
    }

    #[test]
    fn test_parent_mapping_is_not_mutated() {
        let parent = build_context_data_and_set_value(&Context::background(), "r1");
        let before = context_data(&parent).unwrap();

        let child = set_context_data_and_set_value(
            parent.clone(),
            common::request_extra_data("POST"),
            "r2",
        );

        let after = context_data(&parent).unwrap();
        assert_eq!(*after, *before);
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.len(), 1);
        assert_eq!(context_data(&child).unwrap().len(), 3);
    }

    #[test]
    fn test_later_set_sees_union_of_ancestors() {
        let ctx = build_context_data_and_set_value(&Context::background(), "r1");
        let ctx = set_context_data_and_set_value(ctx, [("a", "1")], "r1");
        let ctx = ctx.with_value("unrelated", ());
        let ctx = set_context_data_and_set_value(ctx, [("b", "2")], "r1");
        let ctx = set_context_data_and_set_value(ctx, [("a", "3")], "r1");

        let data = context_data(&ctx).unwrap();
        assert_eq!(data["a"], "3");
        assert_eq!(data["b"], "2");
        assert_eq!(data[CONTEXT_ID_KEY], "r1");
    }

    #[test]
    fn test_request_id_argument_wins_over_extra_id() {
        let ctx = set_context_data_and_set_value(
            Context::background(),
            [(CONTEXT_ID_KEY, "extra"), ("x", "y")],
            "argument",
        );
        assert_eq!(context_data(&ctx).unwrap()[CONTEXT_ID_KEY], "argument");
    }

    #[test]
    fn test_request_carrier_without_context_starts_from_background() {
        let request = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap();

        let request =
            set_context_data_and_set_value(request, common::request_extra_data("GET"), "12");

        let data = context_data(&request.context()).unwrap();
        assert_eq!(data[CONTEXT_ID_KEY], "12");
        assert_eq!(data["http_method"], "GET");
        assert_eq!(data["language"], "language_code");
    }
}

mod concurrency {
    use super::*;

    #[test]
    fn test_sibling_derivations_do_not_cross_contaminate() {
        const THREADS: usize = 64;
        let parent = build_context_data_and_set_value(&Context::background(), "parent");

        let observed: Vec<(String, String)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let parent = &parent;
                    scope.spawn(move || {
                        let id = format!("req-{}", i);
                        let child = set_context_data_and_set_value(
                            parent.clone(),
                            [("worker", i.to_string())],
                            id.as_str(),
                        );
                        // Give siblings a chance to interleave before reading back.
                        std::thread::yield_now();
                        let data = context_data(&child).unwrap();
                        (id, data[CONTEXT_ID_KEY].clone())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(observed.len(), THREADS);
        for (expected, seen) in observed {
            assert_eq!(expected, seen);
        }
        let parent_data = context_data(&parent).unwrap();
        assert_eq!(parent_data.len(), 1);
        assert_eq!(parent_data[CONTEXT_ID_KEY], "parent");
    }

    #[test]
    fn test_long_lived_rederivation_chain_drops_cleanly() {
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let mut ctx = build_context_data_and_set_value(&Context::background(), "loop");
                for i in 0..50_000u32 {
                    ctx = ctx.with_value("tick", i);
                }
                for i in 0..50_000u32 {
                    ctx = set_context_data_and_set_value(ctx, [("iteration", i.to_string())], "loop");
                }
                assert_eq!(context_data(&ctx).unwrap()["iteration"], "49999");
                drop(ctx);
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_contexts_move_across_tasks() {
        let (logger, sink) = common::memory_logger();
        let parent = logger.build_context_data_and_set_value("root");

        let mut handles = Vec::new();
        for i in 0..16 {
            let logger = logger.clone();
            let parent = parent.clone();
            handles.push(tokio::spawn(async move {
                let id = format!("task-{}", i);
                let ctx = logger.set_context_data_and_set_value(parent, [("task", "yes")], id.as_str());
                tokio::task::yield_now().await;
                logger.info(&ctx, &id);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = sink.entries();
        assert_eq!(entries.len(), 16);
        for entry in entries {
            assert_eq!(entry.context[CONTEXT_ID_KEY], entry.message);
        }
    }
}

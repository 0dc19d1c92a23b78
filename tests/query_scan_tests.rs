mod support;

use serde_json::json;
use support::*;

#[tokio::test]
async fn test_query_compiles_hash_key_condition() {
    let transport = MockTransport::new();
    let table = orders_table(transport.clone());

    let output = table.query(json!("u1")).execute().await.unwrap();
    assert!(output.items.is_empty());

    let state = transport.state();
    let request = &state.query_requests[0];
    assert_eq!(request.table_name, "orders");
    assert_eq!(
        request.key_condition_expression.as_deref(),
        Some("(#user_id = :user_id)")
    );
    assert_eq!(
        request.expression_attribute_names.get("#user_id"),
        Some(&"user_id".to_string())
    );
    assert_eq!(request.expression_attribute_values.get(":user_id"), Some(&s("u1")));
}

#[tokio::test]
async fn test_query_key_and_filter_conditions_route_separately() {
    let transport = MockTransport::new();
    let table = orders_table(transport.clone());

    let _ = table
        .query(json!("u1"))
        .where_key("order_id")
        .begins_with(json!("2024"))
        .filter("status")
        .equals(json!("open"))
        .limit(25)
        .descending()
        .consistent_read(true)
        .execute()
        .await
        .unwrap();

    let state = transport.state();
    let request = &state.query_requests[0];

    // The sort-key condition accumulated first; the hash condition is
    // appended at execution time.
    assert_eq!(
        request.key_condition_expression.as_deref(),
        Some("(begins_with(#order_id, :order_id)) AND (#user_id = :user_id)")
    );
    assert_eq!(
        request.filter_expression.as_deref(),
        Some("(#status = :status)")
    );
    assert_eq!(request.limit, Some(25));
    assert_eq!(request.scan_index_forward, Some(false));
    assert_eq!(request.consistent_read, Some(true));
    assert_eq!(request.expression_attribute_values.len(), 3);
}

#[tokio::test]
async fn test_query_placeholders_never_overwrite() {
    let transport = MockTransport::new();
    let table = orders_table(transport.clone());

    // Two conditions on the same path must suffix, not overwrite.
    let _ = table
        .query(json!("u1"))
        .filter("total")
        .gt(json!(10))
        .filter("total")
        .lt(json!(100))
        .execute()
        .await
        .unwrap();

    let state = transport.state();
    let request = &state.query_requests[0];
    assert_eq!(
        request.filter_expression.as_deref(),
        Some("(#total > :total) AND (#total < :total_2)")
    );
    assert_eq!(request.expression_attribute_values.get(":total"), Some(&n("10")));
    assert_eq!(request.expression_attribute_values.get(":total_2"), Some(&n("100")));
}

#[tokio::test]
async fn test_query_using_global_index_switches_hash_attribute() {
    let transport = MockTransport::new();
    let table = orders_table(transport.clone());

    let _ = table
        .query(json!("open"))
        .using_index("status-index")
        .execute()
        .await
        .unwrap();

    let state = transport.state();
    let request = &state.query_requests[0];
    assert_eq!(request.index_name.as_deref(), Some("status-index"));
    assert_eq!(
        request.key_condition_expression.as_deref(),
        Some("(#status = :status)")
    );
}

#[tokio::test]
async fn test_query_projection_attributes() {
    let transport = MockTransport::new();
    let table = orders_table(transport.clone());

    let _ = table
        .query(json!("u1"))
        .attributes(["total", "status"])
        .execute()
        .await
        .unwrap();

    let state = transport.state();
    let request = &state.query_requests[0];
    assert_eq!(request.projection_expression.as_deref(), Some("#total,#status"));
    assert_eq!(
        request.expression_attribute_names.get("#total"),
        Some(&"total".to_string())
    );
}

#[tokio::test]
async fn test_query_single_page_keeps_cursor() {
    let transport = MockTransport::new();
    {
        let mut state = transport.state();
        state
            .query_responses
            .push_back(Ok(page_of(2, "a", Some(item_map("user_id", s("a1"))))));
    }
    let table = orders_table(transport.clone());

    let output = table.query(json!("u1")).execute().await.unwrap();
    assert_eq!(output.items.len(), 2);
    assert!(output.has_more());

    // Without load_all, exactly one physical call is issued.
    assert_eq!(transport.state().query_requests.len(), 1);
}

#[tokio::test]
async fn test_query_load_all_pages_until_exhausted() {
    let transport = MockTransport::new();
    {
        let mut state = transport.state();
        state
            .query_responses
            .push_back(Ok(page_of(2, "a", Some(item_map("user_id", s("a1"))))));
        state
            .query_responses
            .push_back(Ok(page_of(2, "b", Some(item_map("user_id", s("b1"))))));
        state.query_responses.push_back(Ok(page_of(1, "c", None)));
    }
    let table = orders_table(transport.clone());

    let output = table.query(json!("u1")).load_all().execute().await.unwrap();

    assert_eq!(output.items.len(), 5);
    assert_eq!(output.count, 5);
    assert_eq!(output.scanned_count, 5);
    assert_eq!(output.consumed_capacity, Some(3.0));
    assert!(!output.has_more());

    let state = transport.state();
    assert_eq!(state.query_requests.len(), 3);
    // Page 2 carried page 1's cursor; page 3 carried page 2's.
    assert!(state.query_requests[0].exclusive_start_key.is_none());
    assert_eq!(
        state.query_requests[1].exclusive_start_key,
        Some(item_map("user_id", s("a1")))
    );
    assert_eq!(
        state.query_requests[2].exclusive_start_key,
        Some(item_map("user_id", s("b1")))
    );
}

#[tokio::test]
async fn test_pagination_abort_discards_fetched_pages() {
    let transport = MockTransport::new();
    {
        let mut state = transport.state();
        state
            .query_responses
            .push_back(Ok(page_of(2, "a", Some(item_map("user_id", s("a1"))))));
        state
            .query_responses
            .push_back(Err(dynamo_model::TransportError::new("query", "page 2 broke")));
        state.query_responses.push_back(Ok(page_of(2, "c", None)));
    }
    let table = orders_table(transport.clone());

    let error = table
        .query(json!("u1"))
        .load_all()
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(error, dynamo_model::Error::Transport(_)));
    // The failing page aborted the sequence: page 3 was never requested.
    assert_eq!(transport.state().query_requests.len(), 2);
}

#[tokio::test]
async fn test_scan_filter_and_segments() {
    let transport = MockTransport::new();
    let table = orders_table(transport.clone());

    let _ = table
        .scan()
        .filter("status")
        .ne(json!("closed"))
        .segments(2, 8)
        .limit(50)
        .execute()
        .await
        .unwrap();

    let state = transport.state();
    let request = &state.scan_requests[0];
    assert_eq!(request.filter_expression.as_deref(), Some("(#status <> :status)"));
    assert_eq!(request.segment, Some(2));
    assert_eq!(request.total_segments, Some(8));
    assert_eq!(request.limit, Some(50));
}

#[tokio::test]
async fn test_scan_in_list_placeholders() {
    let transport = MockTransport::new();
    let table = orders_table(transport.clone());

    let _ = table
        .scan()
        .filter("status")
        .in_list(vec![json!("open"), json!("stale")])
        .execute()
        .await
        .unwrap();

    let state = transport.state();
    let request = &state.scan_requests[0];
    assert_eq!(
        request.filter_expression.as_deref(),
        Some("(#status IN (:status,:status_2))")
    );
    assert_eq!(request.expression_attribute_values.get(":status"), Some(&s("open")));
    assert_eq!(request.expression_attribute_values.get(":status_2"), Some(&s("stale")));
}

#[tokio::test]
async fn test_parallel_scan_merges_segments() {
    let transport = MockTransport::new();
    {
        let mut state = transport.state();
        for segment in 0..4 {
            let mut responses = std::collections::VecDeque::new();
            responses.push_back(Ok(page_of(10, &format!("seg{segment}-"), None)));
            let _ = state.segment_responses.insert(segment, responses);
        }
    }
    let table = orders_table(transport.clone());

    let output = table.parallel_scan(4).execute().await.unwrap();

    assert_eq!(output.count, 40);
    assert_eq!(output.items.len(), 40);
    assert_eq!(output.scanned_count, 40);
    assert_eq!(output.consumed_capacity, Some(4.0));

    let state = transport.state();
    assert_eq!(state.scan_requests.len(), 4);
    let mut segments: Vec<i32> = state
        .scan_requests
        .iter()
        .map(|request| request.segment.unwrap())
        .collect();
    segments.sort_unstable();
    assert_eq!(segments, [0, 1, 2, 3]);
    assert!(state
        .scan_requests
        .iter()
        .all(|request| request.total_segments == Some(4)));
}

#[tokio::test]
async fn test_parallel_scan_segments_page_to_exhaustion() {
    let transport = MockTransport::new();
    {
        let mut state = transport.state();
        let mut first = std::collections::VecDeque::new();
        first.push_back(Ok(page_of(3, "s0a", Some(item_map("user_id", s("cursor"))))));
        first.push_back(Ok(page_of(2, "s0b", None)));
        let _ = state.segment_responses.insert(0, first);

        let mut second = std::collections::VecDeque::new();
        second.push_back(Ok(page_of(4, "s1", None)));
        let _ = state.segment_responses.insert(1, second);
    }
    let table = orders_table(transport.clone());

    let output = table.parallel_scan(2).execute().await.unwrap();

    assert_eq!(output.items.len(), 9);
    assert_eq!(output.count, 9);
    // Segment 0 issued two physical calls, segment 1 one.
    assert_eq!(transport.state().scan_requests.len(), 3);
}

#[tokio::test]
async fn test_parallel_scan_rejects_on_any_segment_failure() {
    let transport = MockTransport::new();
    {
        let mut state = transport.state();
        let mut ok = std::collections::VecDeque::new();
        ok.push_back(Ok(page_of(10, "s0", None)));
        let _ = state.segment_responses.insert(0, ok);

        let mut bad = std::collections::VecDeque::new();
        bad.push_back(Err(dynamo_model::TransportError::new("scan", "segment 1 broke")));
        let _ = state.segment_responses.insert(1, bad);
    }
    let table = orders_table(transport.clone());

    let error = table.parallel_scan(2).execute().await.unwrap_err();
    assert!(matches!(error, dynamo_model::Error::Transport(_)));
}

#[tokio::test]
async fn test_build_request_is_idempotent() {
    let transport = MockTransport::new();
    let table = orders_table(transport);

    let scan = table.scan().limit(5).segments(1, 2);
    let first = scan.build_request();
    let second = scan.build_request();

    assert_eq!(first.table_name, "orders");
    assert_eq!(second.table_name, "orders");
    assert_eq!(first.limit, second.limit);
    assert_eq!(first.segment, second.segment);
}

// End-to-end test: CSV export on disk through configuration to the JSON report
use errlens::config::Config;
use errlens::records::{validate_headers, CsvSource};
use errlens::{Analyzer, ErrlensError};
use std::io::Write;
use tempfile::NamedTempFile;

const KIBANA_EXPORT: &str = r#"@timestamp,response,error_code,operation_type,error_message,x-stream-client,product,app_id
"Jun 3, 2025 @ 10:00:00.000",400,4,UpdateUsers,"{""code"":4,""message"":""Input error occurred""}",stream-chat-js-v8.57.6-node,chat,"1,001"
"Jun 3, 2025 @ 10:02:00.000",400,4,UpdateUsers,"{""code"":4,""message"":""Input error occurred""}",stream-chat-java-1.29.0,chat,"1,001"

"Jun 3, 2025 @ 10:04:00.000",401,5,QueryChannels,token expired,stream-chat-react-v12.13.1,chat,1002
"Jun 3, 2025 @ 10:05:00.000",404,16,GetMessage,not found,stream-chat-js-v8.60.0-browser,chat,1002
"Jun 3, 2025 @ 10:06:00.000",200,0,GetMessage,,stream-go-client-6.10.0,feeds,1003
"#;

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_kibana_export_to_json() {
    let export = write_file(KIBANA_EXPORT);
    let set = CsvSource::default().read_path(export.path()).unwrap();
    assert_eq!(set.len(), 5);

    let config = Config::default();
    let analyzer = Analyzer::new(config.error_code_table().unwrap(), config.analysis_options());
    let (report, stats) = analyzer.run(&set).unwrap();

    assert_eq!(stats.distinct_apps, 3);
    assert_eq!(stats.unparsed_timestamps, 0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["totalErrors"], 4);
    assert_eq!(json["uniqueErrorCodes"], 3);
    assert_eq!(json["timeWindow"]["start"], "2025-06-03T10:00:00Z");
    assert_eq!(json["timeWindow"]["end"], "2025-06-03T10:06:00Z");

    assert_eq!(json["sdkVersions"]["Java SDK"], "1.29.0");
    assert_eq!(json["sdkVersions"]["client-js-node"], "8.57.6");
    assert_eq!(json["sdkVersions"]["client-js-browser"], "8.60.0");
    assert_eq!(json["sdkVersions"]["React"], "12.13.1");
    assert_eq!(json["sdkVersions"]["Go SDK"], "6.10.0");

    let group = &json["errorGroups"][0];
    assert_eq!(group["responseCode"], "400");
    assert_eq!(group["errorCode"], "4");
    assert_eq!(group["count"], 2);
    assert_eq!(group["operationTypes"][0]["type"], "UpdateUsers");
    assert_eq!(
        group["operationTypes"][0]["exampleMessage"],
        "Input error occurred"
    );
    assert_eq!(
        group["operationTypes"][0]["clients"],
        serde_json::json!(["stream-chat-java-1.29.0", "stream-chat-js-v8.57.6-node"])
    );

    assert_eq!(json["sdkErrorDistribution"][0]["sdkType"], "client-js-node");
    assert_eq!(json["sdkErrorDistribution"][0]["4"], 1);
}

#[test]
fn test_custom_code_table_and_product_filter() {
    let export = write_file(KIBANA_EXPORT);
    let codes = write_file(
        r#"
[[code]]
code = 4
name = "Bad Payload"
description = "The request body failed validation"

[[code]]
code = 16
name = "Missing Resource"
"#,
    );

    let mut config = Config::default();
    config.codes.file = Some(codes.path().to_path_buf());
    config.input.product = Some("chat".to_string());

    let set = CsvSource::default().read_path(export.path()).unwrap();
    let analyzer = Analyzer::new(config.error_code_table().unwrap(), config.analysis_options());
    let (report, stats) = analyzer.run(&set).unwrap();

    assert_eq!(stats.analysed_rows, 4);
    // Versions only cover the rows that survived the product filter
    assert!(report
        .sdk_versions
        .get(errlens::ClientCategory::Go)
        .is_none());

    let names: Vec<(&str, &str)> = report
        .error_groups
        .iter()
        .map(|g| (g.name.as_str(), g.description.as_str()))
        .collect();
    assert!(names.contains(&("Bad Payload", "The request body failed validation")));
    assert!(names.contains(&("Missing Resource", "Missing Resource")));
    // Built-in entries stay available underneath the file
    assert!(names.iter().any(|(name, _)| *name == "Authentication Error"));
}

#[test]
fn test_semicolon_delimited_export() {
    let export = write_file(
        "response;error_code;operation_type;error_message;client_string;product;timestamp\n\
         403;17;SendMessage;denied;stream-chat-android-6.5.0;chat;2025-06-03 10:00:00\n",
    );

    let set = CsvSource::new(b';').read_path(export.path()).unwrap();
    let (report, _) = Analyzer::new(
        Config::default().error_code_table().unwrap(),
        Default::default(),
    )
    .run(&set)
    .unwrap();

    assert_eq!(report.error_groups.len(), 1);
    assert_eq!(report.error_groups[0].error_code, 17);
}

#[test]
fn test_header_check_lists_every_missing_column() {
    let export = write_file("response,error_code,client_string\n400,4,stream-java-client-1.0.0\n");
    let headers = CsvSource::default().read_headers(export.path()).unwrap();

    let err = validate_headers(&headers).unwrap_err();
    assert!(matches!(err, ErrlensError::Schema { .. }));
    assert_eq!(
        err.to_string(),
        "Missing required fields: operation_type, error_message, product, timestamp"
    );
}

#[test]
fn test_missing_export_file() {
    let result = CsvSource::default().read_path(std::path::Path::new("/nonexistent/export.csv"));
    assert!(matches!(result, Err(ErrlensError::Io { .. })));
}

#[test]
fn test_export_with_duplicate_client_columns_and_latin1_bytes() {
    let mut export = NamedTempFile::new().unwrap();
    export
        .write_all(
            b"response,error_code,operation_type,error_message,x-stream-client,client_string,product,timestamp\n\
              400,4,UpdateUsers,caf\xE9 rejected,stream-java-client-1.29.0,,chat,2025-06-03T10:00:00Z\n",
        )
        .unwrap();

    let source = CsvSource::default();
    validate_headers(&source.read_headers(export.path()).unwrap()).unwrap();
    assert_eq!(source.count_rows(export.path()).unwrap(), 1);

    let set = source.read_path(export.path()).unwrap();
    let (report, _) = Analyzer::new(
        Config::default().error_code_table().unwrap(),
        Default::default(),
    )
    .run(&set)
    .unwrap();

    let op = &report.error_groups[0].operation_types[0];
    assert_eq!(op.clients, vec!["stream-java-client-1.29.0".to_string()]);
    assert_eq!(op.example_message, "caf\u{FFFD} rejected");
}

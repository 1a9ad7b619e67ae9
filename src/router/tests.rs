use super::{path_to_regex, Router};
use http::Method;

#[test]
fn test_root_path() {
    let (re, params) = path_to_regex("/").unwrap();
    assert!(re.is_match("/"));
    assert!(params.is_empty());
}

#[test]
fn test_parameterized_path() {
    let (re, params) = path_to_regex("/items/{id}").unwrap();
    assert!(re.is_match("/items/123"));
    assert!(!re.is_match("/items/123/more"));
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].as_ref(), "id");
}

#[test]
fn test_param_inside_segment() {
    let (re, params) = path_to_regex("/api/v{version}/pets").unwrap();
    let caps = re.captures("/api/v3/pets").unwrap();
    assert_eq!(&caps[1], "3");
    assert_eq!(params[0].as_ref(), "version");
    assert!(!re.is_match("/api/3/pets"));
}

#[test]
fn test_literal_is_escaped() {
    let (re, _) = path_to_regex("/a.b/{x}").unwrap();
    assert!(re.is_match("/a.b/1"));
    assert!(!re.is_match("/aXb/1"));
}

#[test]
fn test_malformed_templates() {
    assert!(path_to_regex("/a/{b").is_err());
    assert!(path_to_regex("/a/b}").is_err());
    assert!(path_to_regex("/a/{}").is_err());
    assert!(path_to_regex("/{a}/{a}").is_err());
}

#[test]
fn test_method_and_order() {
    let mut router = Router::new("/base/");
    router.add(Method::GET, "/pets", 1).unwrap();
    router.add(Method::POST, "/pets", 2).unwrap();
    router.add(Method::GET, "/pets/{resource_id}", 3).unwrap();

    assert_eq!(router.base_path(), "/base");
    assert_eq!(*router.route(&Method::POST, "/base/pets").unwrap().route.target(), 2);
    let m = router.route(&Method::GET, "/base/pets/9").unwrap();
    assert_eq!(*m.route.target(), 3);
    assert_eq!(m.get_path_param("resource_id"), Some("9"));
    assert!(router.route(&Method::DELETE, "/base/pets/9").is_none());
    assert!(router.route(&Method::GET, "/pets").is_none());
}

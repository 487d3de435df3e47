use super::*;

#[test]
fn test_library_types_are_binary() {
    let mut symbols = SymbolTable::new();
    let object = declare_library(&mut symbols);
    assert_eq!(symbols[object].name, "Object");
    assert!(symbols[object].is_binary());
    assert_eq!(symbols[object].superclass, None);

    let string = symbols.find_top_level("java.lang", "String").expect("String");
    assert!(symbols[string].is_binary());
    assert_eq!(symbols[string].superclass, Some(object));
}

#[test]
fn test_library_hierarchy_and_members() {
    let mut symbols = SymbolTable::new();
    declare_library(&mut symbols);
    let list = symbols.find_top_level("java.util", "ArrayList").expect("ArrayList");
    let collection = symbols.find_top_level("java.util", "Collection").expect("Collection");
    assert!(symbols.is_subtype(list, collection));
    assert_eq!(symbols.lookup_methods(list, "size").len(), 1, "inherited from Collection");

    let system = symbols.find_top_level("java.lang", "System").expect("System");
    let out = symbols.lookup_field(system, "out").expect("System.out");
    assert!(symbols.is_static(out));
    let print_stream = symbols[out].value_type.expect("typed");
    assert_eq!(symbols[print_stream].name, "PrintStream");
}

#[test]
fn test_library_varargs() {
    let mut symbols = SymbolTable::new();
    declare_library(&mut symbols);
    let string = symbols.find_top_level("java.lang", "String").expect("String");
    let format = symbols.lookup_methods(string, "format");
    assert!(symbols[format[0]].varargs);
    assert!(symbols[format[0]].accepts_arity(3));
}

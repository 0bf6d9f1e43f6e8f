use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::Serialize;
use serde_json::value::{to_value, Map, Value};

use crate::errors::{Error, Result as MoustacheResult};

/// A zero-argument accessor that can be registered on a [`Context`].
///
/// Methods are tried before fields when a name is looked up, and are called
/// every time the name is resolved.
pub trait Method: Sync + Send {
    /// The method's implementation
    fn call(&self) -> MoustacheResult<Value>;
}

impl<F> Method for F
where
    F: Fn() -> MoustacheResult<Value> + Sync + Send,
{
    fn call(&self) -> MoustacheResult<Value> {
        self()
    }
}

/// The struct that holds the context of a template rendering.
///
/// Light wrapper around a `BTreeMap` for easier insertions of Serializable
/// values, plus the methods and nested contexts registered on it.
#[derive(Clone, Default)]
pub struct Context {
    data: BTreeMap<String, Value>,
    methods: BTreeMap<String, Arc<dyn Method>>,
    records: BTreeMap<String, Nested>,
}

/// A context stored inside another one
#[derive(Clone, Debug, PartialEq)]
enum Nested {
    One(Context),
    Many(Vec<Context>),
}

impl Nested {
    fn into_json(self) -> Value {
        match self {
            Nested::One(context) => context.into_json(),
            Nested::Many(contexts) => {
                Value::Array(contexts.into_iter().map(Context::into_json).collect())
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("data", &self.data)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("records", &self.records)
            .finish()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
            && self.methods.keys().eq(other.methods.keys())
            && self.records == other.records
    }
}

impl Context {
    /// Initializes an empty context
    pub fn new() -> Self {
        Context { data: BTreeMap::new(), methods: BTreeMap::new(), records: BTreeMap::new() }
    }

    /// Converts the `val` parameter to `Value` and insert it into the context.
    ///
    /// Panics if the serialization fails.
    ///
    /// ```rust
    /// # use moustache::Context;
    /// let mut context = moustache::Context::new();
    /// context.insert("number_users", &42);
    /// ```
    pub fn insert<T: Serialize + ?Sized, S: Into<String>>(&mut self, key: S, val: &T) {
        let key = key.into();
        self.records.remove(&key);
        self.data.insert(key, to_value(val).unwrap());
    }

    /// Converts the `val` parameter to `Value` and insert it into the context.
    ///
    /// Returns an error if the serialization fails.
    ///
    /// ```rust
    /// # use moustache::Context;
    /// # struct CannotBeSerialized;
    /// # impl serde::Serialize for CannotBeSerialized {
    /// #     fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    /// #         Err(serde::ser::Error::custom("Error"))
    /// #     }
    /// # }
    /// # let user = CannotBeSerialized;
    /// let mut context = Context::new();
    /// // user is an instance of a struct implementing `Serialize`
    /// if let Err(_) = context.try_insert("number_users", &user) {
    ///     // Serialization failed
    /// }
    /// ```
    pub fn try_insert<T: Serialize + ?Sized, S: Into<String>>(
        &mut self,
        key: S,
        val: &T,
    ) -> MoustacheResult<()> {
        let value = to_value(val)?;
        let key = key.into();
        self.records.remove(&key);
        self.data.insert(key, value);

        Ok(())
    }

    /// Registers a zero-argument method under `key`.
    ///
    /// A method shadows a field of the same name.
    ///
    /// ```rust
    /// # use moustache::Context;
    /// let mut context = Context::new();
    /// context.insert_method("answer", || Ok(serde_json::json!(42)));
    /// ```
    pub fn insert_method<M: Method + 'static, S: Into<String>>(&mut self, key: S, method: M) {
        self.methods.insert(key.into(), Arc::new(method));
    }

    /// Nests `record` under `key`, keeping its methods callable.
    ///
    /// `{{ key.name }}` and the body of `{{# key }}` see the record's methods as well
    /// as its fields. A nested record is always truthy.
    ///
    /// ```rust
    /// # use moustache::Context;
    /// let mut user = Context::new();
    /// user.insert_method("initial", || Ok(serde_json::json!("J")));
    /// let mut context = Context::new();
    /// context.insert_context("user", user);
    /// ```
    pub fn insert_context<S: Into<String>>(&mut self, key: S, record: Context) {
        let key = key.into();
        self.data.remove(&key);
        self.records.insert(key, Nested::One(record));
    }

    /// Nests a list of records under `key`: a section over `key` renders once per record.
    pub fn insert_contexts<S: Into<String>>(&mut self, key: S, records: Vec<Context>) {
        let key = key.into();
        self.data.remove(&key);
        self.records.insert(key, Nested::Many(records));
    }

    /// Appends the data, methods and nested contexts of `source` to `self`, overwriting existing keys.
    pub fn extend(&mut self, mut source: Context) {
        for key in source.data.keys() {
            self.records.remove(key);
        }
        for key in source.records.keys() {
            self.data.remove(key);
        }
        self.data.append(&mut source.data);
        self.methods.append(&mut source.methods);
        self.records.append(&mut source.records);
    }

    /// Converts the context to a `serde_json::Value` consuming the context.
    ///
    /// Methods are not part of the conversion, nested contexts become objects.
    pub fn into_json(self) -> Value {
        let mut m = Map::new();
        for (key, value) in self.data {
            m.insert(key, value);
        }
        for (key, nested) in self.records {
            m.insert(key, nested.into_json());
        }
        Value::Object(m)
    }

    /// Takes a serde-json `Value` and convert it into a `Context` with no overhead/cloning.
    pub fn from_value(obj: Value) -> MoustacheResult<Self> {
        match obj {
            Value::Object(m) => {
                let mut data = BTreeMap::new();
                for (key, value) in m {
                    data.insert(key, value);
                }
                Ok(Context { data, methods: BTreeMap::new(), records: BTreeMap::new() })
            }
            _ => Err(Error::msg(
                "Creating a Context from a Value/Serialize requires it being a JSON object",
            )),
        }
    }

    /// Takes something that impl Serialize and create a context with it.
    /// Meant to be used if you have a hashmap or a struct and don't want to insert values
    /// one by one in the context.
    pub fn from_serialize(value: impl Serialize) -> MoustacheResult<Self> {
        let obj = to_value(value).map_err(Error::json)?;
        Context::from_value(obj)
    }

    /// Returns the value at a given key index.
    pub fn get(&self, index: &str) -> Option<&Value> {
        self.data.get(index)
    }

    /// Remove a key from the context, returning the value at the key if the key was previously inserted into the context.
    pub fn remove(&mut self, index: &str) -> Option<Value> {
        let nested = self.records.remove(index).map(Nested::into_json);
        self.data.remove(index).or(nested)
    }

    /// Checks if a value, a method or a nested context exists at a specific index.
    pub fn contains_key(&self, index: &str) -> bool {
        self.data.contains_key(index)
            || self.methods.contains_key(index)
            || self.records.contains_key(index)
    }

    /// Resolves `name` on this record: methods first, then fields.
    pub(crate) fn resolve(&self, name: &str) -> MoustacheResult<Option<Val<'_>>> {
        if let Some(method) = self.methods.get(name) {
            return method
                .call()
                .map(|v| Some(Val::Json(Cow::Owned(v))))
                .map_err(|e| Error::call_method(name, e));
        }

        if let Some(nested) = self.records.get(name) {
            return Ok(Some(match *nested {
                Nested::One(ref record) => Val::Record(record),
                Nested::Many(ref records) => Val::Records(records),
            }));
        }

        Ok(self.data.get(name).map(|v| Val::Json(Cow::Borrowed(v))))
    }
}

/// What a name resolves to during rendering
#[derive(Clone, Debug)]
pub enum Val<'a> {
    /// Plain data, owned when it comes out of a method
    Json(Cow<'a, Value>),
    /// A nested context
    Record(&'a Context),
    /// A list of nested contexts
    Records(&'a [Context]),
}

impl<'a> Val<'a> {
    /// Resolves one more path segment: a method, then a field, then an array index.
    pub(crate) fn get(self, segment: &str) -> MoustacheResult<Option<Val<'a>>> {
        match self {
            Val::Json(Cow::Borrowed(value)) => {
                Ok(get_attr(value, segment).map(|v| Val::Json(Cow::Borrowed(v))))
            }
            Val::Json(Cow::Owned(value)) => {
                Ok(get_attr(&value, segment).cloned().map(|v| Val::Json(Cow::Owned(v))))
            }
            Val::Record(record) => record.resolve(segment),
            Val::Records(records) => Ok(segment
                .parse::<usize>()
                .ok()
                .and_then(|i| records.get(i))
                .map(Val::Record)),
        }
    }
}

/// Looks up a single path segment on a value: a key on objects, an index on arrays.
///
/// An empty segment never matches.
#[inline]
pub fn get_attr<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    if segment.is_empty() {
        return None;
    }

    match *value {
        Value::Object(ref map) => map.get(segment),
        Value::Array(ref arr) => segment.parse::<usize>().ok().and_then(|i| arr.get(i)),
        _ => None,
    }
}

/// Follows a dotted path (`a.b.0`) down a value
#[inline]
pub fn dotted_pointer<'a>(value: &'a Value, pointer: &str) -> Option<&'a Value> {
    pointer.split('.').try_fold(value, get_attr)
}

/// Converts a Value into something that can be written in a template
pub trait ValueRender {
    /// How the value looks once rendered
    fn render(&self) -> Cow<'_, str>;
}

impl ValueRender for Val<'_> {
    fn render(&self) -> Cow<'_, str> {
        match *self {
            Val::Json(ref value) => value.render(),
            Val::Record(_) => Cow::Borrowed("[object]"),
            Val::Records(records) => {
                Cow::Owned(format!("[{}]", vec!["[object]"; records.len()].join(", ")))
            }
        }
    }
}

impl ValueRender for Value {
    fn render(&self) -> Cow<'_, str> {
        match *self {
            Value::String(ref s) => Cow::Borrowed(s),
            Value::Number(ref i) => Cow::Owned(i.to_string()),
            Value::Bool(i) => Cow::Owned(i.to_string()),
            Value::Null => Cow::Owned(String::new()),
            Value::Array(ref a) => {
                let mut buf = String::new();
                buf.push('[');
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    buf.push_str(v.render().as_ref());
                }
                buf.push(']');
                Cow::Owned(buf)
            }
            Value::Object(_) => Cow::Borrowed("[object]"),
        }
    }
}

/// Decides whether a section should be rendered for a value
pub trait ValueTruthy {
    /// `false` for null, `false`, zero and empty strings, arrays and objects
    fn is_truthy(&self) -> bool;
}

impl ValueTruthy for Value {
    fn is_truthy(&self) -> bool {
        match *self {
            Value::Number(ref i) => {
                if let Some(n) = i.as_i64() {
                    return n != 0;
                }
                if let Some(n) = i.as_u64() {
                    return n != 0;
                }
                i.as_f64().map_or(false, |f| f != 0.0)
            }
            Value::Bool(ref i) => *i,
            Value::Null => false,
            Value::String(ref i) => !i.is_empty(),
            Value::Array(ref i) => !i.is_empty(),
            Value::Object(ref i) => !i.is_empty(),
        }
    }
}

impl ValueTruthy for Val<'_> {
    fn is_truthy(&self) -> bool {
        match *self {
            Val::Json(ref value) => value.is_truthy(),
            Val::Record(_) => true,
            Val::Records(records) => !records.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn can_extend_context() {
        let mut target = Context::new();
        target.insert("a", &1);
        target.insert("b", &2);
        let mut source = Context::new();
        source.insert("b", &3);
        source.insert("d", &4);
        source.insert_method("e", || Ok(json!(5)));
        target.extend(source);
        assert_eq!(*target.data.get("a").unwrap(), to_value(1).unwrap());
        assert_eq!(*target.data.get("b").unwrap(), to_value(3).unwrap());
        assert_eq!(*target.data.get("d").unwrap(), to_value(4).unwrap());
        assert!(target.contains_key("e"));
    }

    #[test]
    fn can_create_context_from_value() {
        let obj = json!({
            "name": "bob",
            "age": 25
        });
        let context_from_value = Context::from_value(obj).unwrap();
        let mut context = Context::new();
        context.insert("name", "bob");
        context.insert("age", &25);
        assert_eq!(context_from_value, context);
    }

    #[test]
    fn can_create_context_from_impl_serialize() {
        let mut map = HashMap::new();
        map.insert("name", "bob");
        map.insert("last_name", "something");
        let context_from_serialize = Context::from_serialize(&map).unwrap();
        let mut context = Context::new();
        context.insert("name", "bob");
        context.insert("last_name", "something");
        assert_eq!(context_from_serialize, context);
    }

    #[test]
    fn cannot_create_context_from_non_object() {
        assert!(Context::from_value(json!([1, 2])).is_err());
        assert!(Context::from_serialize(&"hello").is_err());
    }

    #[test]
    fn can_remove_a_key() {
        let mut context = Context::new();
        context.insert("name", "foo");
        context.insert("bio", "Hi, I'm foo.");

        let mut expected = Context::new();
        expected.insert("name", "foo");
        assert_eq!(context.remove("bio"), Some(to_value("Hi, I'm foo.").unwrap()));
        assert_eq!(context.get("bio"), None);
        assert_eq!(context, expected);
    }

    #[test]
    fn methods_shadow_fields() {
        let mut context = Context::new();
        context.insert("name", "field");
        context.insert_method("name", || Ok(json!("method")));

        assert_eq!(json_of(context.resolve("name").unwrap()), json!("method"));
    }

    fn json_of(val: Option<Val<'_>>) -> Value {
        match val {
            Some(Val::Json(value)) => value.into_owned(),
            other => panic!("expected plain data, got {:?}", other),
        }
    }

    #[test]
    fn nested_records_keep_their_methods() {
        let mut user = Context::new();
        user.insert("first", "Ada");
        user.insert_method("greeting", || Ok(json!("hi")));
        let mut context = Context::new();
        context.insert_context("user", user);

        let found = context.resolve("user").unwrap().unwrap();
        assert!(found.is_truthy());
        assert_eq!(found.render(), "[object]");
        assert_eq!(json_of(found.clone().get("greeting").unwrap()), json!("hi"));
        assert_eq!(json_of(found.get("first").unwrap()), json!("Ada"));
    }

    #[test]
    fn nested_record_lists_are_indexable() {
        let mut first = Context::new();
        first.insert("n", &1);
        let mut context = Context::new();
        context.insert_contexts("items", vec![first, Context::new()]);
        context.insert_contexts("none", vec![]);

        let items = context.resolve("items").unwrap().unwrap();
        assert!(items.is_truthy());
        assert_eq!(items.render(), "[[object], [object]]");
        let first = items.get("0").unwrap().unwrap();
        assert_eq!(json_of(first.get("n").unwrap()), json!(1));
        assert!(!context.resolve("none").unwrap().unwrap().is_truthy());
    }

    #[test]
    fn inserting_a_field_replaces_a_nested_record() {
        let mut context = Context::new();
        context.insert_context("user", Context::new());
        context.insert("user", "plain");
        assert_eq!(json_of(context.resolve("user").unwrap()), json!("plain"));

        context.insert_context("user", Context::new());
        assert_eq!(context.get("user"), None);
        assert!(context.contains_key("user"));
    }

    #[test]
    fn nested_records_become_objects_in_json() {
        let mut user = Context::new();
        user.insert("name", "Ada");
        user.insert_method("ignored", || Ok(json!(1)));
        let mut context = Context::new();
        context.insert_context("user", user);
        context.insert_contexts("list", vec![Context::new()]);

        assert_eq!(context.into_json(), json!({"user": {"name": "Ada"}, "list": [{}]}));
    }

    #[test]
    fn failing_method_is_reported() {
        let mut context = Context::new();
        context.insert_method("boom", || -> MoustacheResult<Value> { Err(Error::msg("no")) });

        let err = context.resolve("boom").unwrap_err();
        assert_eq!(err.to_string(), "Method call 'boom' failed");
    }

    #[test]
    fn dotted_pointer_walks_objects_and_arrays() {
        let value = json!({"a": {"b": [10, {"c": "v"}]}});
        assert_eq!(dotted_pointer(&value, "a.b.0"), Some(&json!(10)));
        assert_eq!(dotted_pointer(&value, "a.b.1.c"), Some(&json!("v")));
        assert_eq!(dotted_pointer(&value, "a.x"), None);
        assert_eq!(dotted_pointer(&value, ""), None);
        assert_eq!(dotted_pointer(&value, "a."), None);
    }

    #[test]
    fn test_truthiness() {
        let inputs = vec![
            (json!(null), false),
            (json!(true), true),
            (json!(false), false),
            (json!(0), false),
            (json!(-3), true),
            (json!(0.0), false),
            (json!(0.5), true),
            (json!(""), false),
            (json!("a"), true),
            (json!([]), false),
            (json!([0]), true),
            (json!({}), false),
            (json!({"a": 1}), true),
        ];
        for (value, expected) in inputs {
            assert_eq!(value.is_truthy(), expected, "{:?}", value);
        }
    }

    #[test]
    fn test_render_values() {
        assert_eq!(json!("hey").render(), "hey");
        assert_eq!(json!(1.5).render(), "1.5");
        assert_eq!(json!(false).render(), "false");
        assert_eq!(json!(null).render(), "");
        assert_eq!(json!([1, "a", [true]]).render(), "[1, a, [true]]");
        assert_eq!(json!({"a": 1}).render(), "[object]");
    }
}

use log::debug;

use crate::command::{Request, UpdateArgs};
use crate::error::{CommandError, StoreError};
use crate::model::registry::{EntityRegistry, VariantSchema};
use crate::model::value::FieldValue;
use crate::store::ObjectStore;

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Uniform answer to one executed request.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ok { output: String },
    Error { message: String },
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Executes normalized requests against the store. One handler per verb,
/// shared by both grammars.
pub struct Dispatcher {
    registry: EntityRegistry,
    store: ObjectStore,
}

/// Internal failure channel. Command diagnostics fold into the response;
/// storage failures propagate to the caller.
enum Failure {
    Command(CommandError),
    Store(StoreError),
}

impl From<CommandError> for Failure {
    fn from(e: CommandError) -> Self {
        Failure::Command(e)
    }
}

impl From<StoreError> for Failure {
    fn from(e: StoreError) -> Self {
        Failure::Store(e)
    }
}

impl Dispatcher {
    pub fn new(registry: EntityRegistry, store: ObjectStore) -> Dispatcher {
        Dispatcher { registry, store }
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Run one request. Command diagnostics come back as `Response::Error`;
    /// storage failures are fatal to the session and surface as `Err`.
    pub fn execute(&mut self, request: Request) -> Result<Response, StoreError> {
        debug!("execute: {:?}", request);
        let outcome = match request {
            Request::Create { class } => self.cmd_create(class),
            Request::Show { class, id } => self.cmd_show(class, id),
            Request::Destroy { class, id } => self.cmd_destroy(class, id),
            Request::Update { class, id, args } => self.cmd_update(class, id, args),
            Request::All { class } => self.cmd_all(class),
            Request::Count { class } => self.cmd_count(class),
        };
        match outcome {
            Ok(output) => Ok(Response::Ok { output }),
            Err(Failure::Command(e)) => Ok(Response::Error {
                message: e.to_string(),
            }),
            Err(Failure::Store(e)) => Err(e),
        }
    }

    /// Class-name validation shared by every verb that requires a type.
    fn resolve(&self, class: Option<&str>) -> Result<&'static VariantSchema, CommandError> {
        let name = class.ok_or(CommandError::ClassMissing)?;
        self.registry
            .resolve(name)
            .ok_or(CommandError::ClassUnknown)
    }

    fn cmd_create(&mut self, class: Option<String>) -> Result<String, Failure> {
        let schema = self.resolve(class.as_deref())?;
        let entity = schema.construct();
        let id = entity.id().to_string();
        self.store.register(entity);
        self.store.persist()?;
        Ok(id)
    }

    fn cmd_show(&self, class: Option<String>, id: Option<String>) -> Result<String, Failure> {
        let schema = self.resolve(class.as_deref())?;
        let id = id.ok_or(CommandError::IdMissing)?;
        let entity = self
            .store
            .lookup(schema.name, &id)
            .ok_or(CommandError::NotFound)?;
        Ok(entity.to_string())
    }

    fn cmd_destroy(
        &mut self,
        class: Option<String>,
        id: Option<String>,
    ) -> Result<String, Failure> {
        let schema = self.resolve(class.as_deref())?;
        let id = id.ok_or(CommandError::IdMissing)?;
        if self.store.remove(schema.name, &id).is_none() {
            return Err(CommandError::NotFound.into());
        }
        self.store.persist()?;
        Ok(String::new())
    }

    fn cmd_update(
        &mut self,
        class: Option<String>,
        id: Option<String>,
        args: UpdateArgs,
    ) -> Result<String, Failure> {
        let schema = self.resolve(class.as_deref())?;
        let id = id.ok_or(CommandError::IdMissing)?;
        match self.store.lookup_mut(schema.name, &id) {
            None => return Err(CommandError::NotFound.into()),
            Some(entity) => {
                for (field, value) in update_pairs(args)? {
                    entity.set(&field, value);
                }
                entity.touch();
            }
        }
        self.store.persist()?;
        Ok(String::new())
    }

    fn cmd_all(&self, class: Option<String>) -> Result<String, Failure> {
        let filter = match class {
            None => None,
            Some(name) => Some(
                self.registry
                    .resolve(&name)
                    .ok_or(CommandError::ClassUnknown)?
                    .name,
            ),
        };
        let lines: Vec<String> = self
            .store
            .entities()
            .filter(|e| filter.map_or(true, |variant| e.variant() == variant))
            .map(|e| e.to_string())
            .collect();
        Ok(lines.join("\n"))
    }

    fn cmd_count(&self, class: Option<String>) -> Result<String, Failure> {
        let name = class.ok_or(CommandError::ClassMissing)?;
        Ok(self.store.count_of(&name).to_string())
    }
}

/// Flatten update arguments into attribute pairs, raising the attr/value
/// diagnostics for incomplete input. Pair values stay text; mapping values
/// keep their decoded types.
fn update_pairs(args: UpdateArgs) -> Result<Vec<(String, FieldValue)>, CommandError> {
    match args {
        UpdateArgs::Pair { attr, value } => {
            let attr = attr.ok_or(CommandError::AttrMissing)?;
            let value = value.ok_or(CommandError::ValueMissing)?;
            Ok(vec![(attr, FieldValue::Text(value))])
        }
        UpdateArgs::Map(pairs) => {
            if pairs.is_empty() {
                return Err(CommandError::AttrMissing);
            }
            Ok(pairs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_line, ParsedLine};
    use std::path::PathBuf;
    use std::time::Duration;
    use uuid::Uuid;

    fn dispatcher(tag: &str) -> (Dispatcher, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "lodgebook-dispatch-{}-{}.json",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let store = ObjectStore::new(&path);
        (Dispatcher::new(EntityRegistry::builtin(), store), path)
    }

    fn run(dispatcher: &mut Dispatcher, line: &str) -> Response {
        match parse_line(line) {
            ParsedLine::Request(request) => dispatcher.execute(request).unwrap(),
            other => panic!("expected a request for {:?}, got {:?}", line, other),
        }
    }

    fn run_ok(dispatcher: &mut Dispatcher, line: &str) -> String {
        match run(dispatcher, line) {
            Response::Ok { output } => output,
            Response::Error { message } => panic!("unexpected error for {:?}: {}", line, message),
        }
    }

    fn run_err(dispatcher: &mut Dispatcher, line: &str) -> String {
        match run(dispatcher, line) {
            Response::Error { message } => message,
            Response::Ok { output } => panic!("unexpected success for {:?}: {}", line, output),
        }
    }

    // --- create ---

    #[test]
    fn create_prints_the_new_id() {
        let (mut d, path) = dispatcher("create");
        let id = run_ok(&mut d, "create User");
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(d.store().len(), 1);
        assert!(d.store().lookup("User", &id).is_some());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn create_works_under_both_grammars() {
        let (mut d, path) = dispatcher("create-both");
        let first = run_ok(&mut d, "create State");
        let second = run_ok(&mut d, "State.create()");
        assert_ne!(first, second);
        assert_eq!(d.store().count_of("State"), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn create_validates_the_class() {
        let (mut d, path) = dispatcher("create-class");
        assert_eq!(run_err(&mut d, "create"), "** class name missing **");
        assert_eq!(run_err(&mut d, "create MyModel"), "** class doesn't exist **");
        assert_eq!(run_err(&mut d, "MyModel.create()"), "** class doesn't exist **");
        assert!(d.store().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn create_persists_immediately() {
        let (mut d, path) = dispatcher("create-persist");
        let id = run_ok(&mut d, "create Amenity");

        let registry = EntityRegistry::builtin();
        let mut reloaded = ObjectStore::new(&path);
        reloaded.load(&registry).unwrap();
        assert!(reloaded.lookup("Amenity", &id).is_some());
        let _ = std::fs::remove_file(&path);
    }

    // --- show ---

    #[test]
    fn show_renders_the_stored_entity() {
        let (mut d, path) = dispatcher("show");
        let id = run_ok(&mut d, "create User");
        let out = run_ok(&mut d, &format!("show User {}", id));
        assert!(out.starts_with(&format!("[User] ({})", id)));
        assert!(out.contains("created_at: "));
        assert!(out.contains("updated_at: "));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn show_ladder_canonical() {
        let (mut d, path) = dispatcher("show-ladder");
        assert_eq!(run_err(&mut d, "show"), "** class name missing **");
        assert_eq!(run_err(&mut d, "show MyModel"), "** class doesn't exist **");
        assert_eq!(run_err(&mut d, "show User"), "** instance id missing **");
        assert_eq!(run_err(&mut d, "show User nope"), "** no instance found **");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn show_ladder_method() {
        let (mut d, path) = dispatcher("show-ladder-dot");
        assert_eq!(run_err(&mut d, ".show()"), "** class name missing **");
        assert_eq!(run_err(&mut d, "MyModel.show()"), "** class doesn't exist **");
        assert_eq!(run_err(&mut d, "User.show()"), "** instance id missing **");
        assert_eq!(run_err(&mut d, "User.show(nope)"), "** no instance found **");
        let _ = std::fs::remove_file(&path);
    }

    // --- destroy ---

    #[test]
    fn destroy_removes_and_persists() {
        let (mut d, path) = dispatcher("destroy");
        let id = run_ok(&mut d, "create Review");
        assert_eq!(run_ok(&mut d, &format!("destroy Review {}", id)), "");
        assert!(d.store().is_empty());

        let registry = EntityRegistry::builtin();
        let mut reloaded = ObjectStore::new(&path);
        reloaded.load(&registry).unwrap();
        assert!(reloaded.is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn destroy_unknown_id_leaves_the_store_alone() {
        let (mut d, path) = dispatcher("destroy-miss");
        run_ok(&mut d, "create Review");
        assert_eq!(run_err(&mut d, "destroy Review nope"), "** no instance found **");
        assert_eq!(d.store().len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn destroy_method_form() {
        let (mut d, path) = dispatcher("destroy-dot");
        let id = run_ok(&mut d, "create City");
        assert_eq!(run_ok(&mut d, &format!("City.destroy(\"{}\")", id)), "");
        assert!(d.store().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    // --- update ---

    #[test]
    fn update_triple_stores_raw_text() {
        let (mut d, path) = dispatcher("update-triple");
        let id = run_ok(&mut d, "create Place");
        assert_eq!(run_ok(&mut d, &format!("update Place {} max_guest 98", id)), "");
        let entity = d.store().lookup("Place", &id).unwrap();
        assert_eq!(entity.get("max_guest"), Some(&FieldValue::Text("98".into())));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_method_triple_also_stores_text() {
        let (mut d, path) = dispatcher("update-triple-dot");
        let id = run_ok(&mut d, "create Place");
        run_ok(&mut d, &format!("Place.update({}, max_guest, 98)", id));
        let entity = d.store().lookup("Place", &id).unwrap();
        assert_eq!(entity.get("max_guest"), Some(&FieldValue::Text("98".into())));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_triple_strips_one_quote_layer() {
        let (mut d, path) = dispatcher("update-quotes");
        let id = run_ok(&mut d, "create User");
        run_ok(&mut d, &format!("update User {} first_name 'Betty'", id));
        let entity = d.store().lookup("User", &id).unwrap();
        assert_eq!(entity.get("first_name"), Some(&FieldValue::Text("Betty".into())));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_mapping_preserves_literal_types() {
        let (mut d, path) = dispatcher("update-map");
        let id = run_ok(&mut d, "create Place");
        run_ok(
            &mut d,
            &format!(
                "Place.update({}, {{'max_guest': 98, 'latitude': 9.8, 'name': 'loft'}})",
                id
            ),
        );
        let entity = d.store().lookup("Place", &id).unwrap();
        assert_eq!(entity.get("max_guest"), Some(&FieldValue::Int(98)));
        assert_eq!(entity.get("latitude"), Some(&FieldValue::Float(9.8)));
        assert_eq!(entity.get("name"), Some(&FieldValue::Text("loft".into())));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_mapping_works_in_canonical_form() {
        let (mut d, path) = dispatcher("update-map-canonical");
        let id = run_ok(&mut d, "create Place");
        run_ok(&mut d, &format!("update Place {} {{'max_guest': 98}})", id));
        let entity = d.store().lookup("Place", &id).unwrap();
        assert_eq!(entity.get("max_guest"), Some(&FieldValue::Int(98)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_mapping_with_missing_comma() {
        let (mut d, path) = dispatcher("update-map-comma");
        let id = run_ok(&mut d, "create User");
        run_ok(&mut d, &format!("User.update({}{{'first_name': 'Betty'}})", id));
        let entity = d.store().lookup("User", &id).unwrap();
        assert_eq!(entity.get("first_name"), Some(&FieldValue::Text("Betty".into())));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_refreshes_updated_at() {
        let (mut d, path) = dispatcher("update-touch");
        let id = run_ok(&mut d, "create User");
        let created = d.store().lookup("User", &id).unwrap().created_at();
        std::thread::sleep(Duration::from_millis(5));
        run_ok(&mut d, &format!("update User {} nickname Al", id));
        let entity = d.store().lookup("User", &id).unwrap();
        assert!(entity.updated_at() > created);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_ladder_prefers_not_found_over_attr_missing() {
        let (mut d, path) = dispatcher("update-ladder");
        assert_eq!(run_err(&mut d, "update"), "** class name missing **");
        assert_eq!(run_err(&mut d, "update MyModel"), "** class doesn't exist **");
        assert_eq!(run_err(&mut d, "update User"), "** instance id missing **");
        assert_eq!(run_err(&mut d, "update User 1"), "** no instance found **");

        let id = run_ok(&mut d, "create User");
        assert_eq!(
            run_err(&mut d, &format!("update User {}", id)),
            "** attribute name missing **"
        );
        assert_eq!(
            run_err(&mut d, &format!("update User {} attr_name", id)),
            "** value missing **"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_ladder_method() {
        let (mut d, path) = dispatcher("update-ladder-dot");
        assert_eq!(run_err(&mut d, ".update()"), "** class name missing **");
        assert_eq!(run_err(&mut d, "MyModel.update()"), "** class doesn't exist **");
        assert_eq!(run_err(&mut d, "User.update()"), "** instance id missing **");
        assert_eq!(run_err(&mut d, "User.update(1)"), "** no instance found **");

        let id = run_ok(&mut d, "create User");
        assert_eq!(
            run_err(&mut d, &format!("User.update({})", id)),
            "** attribute name missing **"
        );
        assert_eq!(
            run_err(&mut d, &format!("User.update({}, attr_name)", id)),
            "** value missing **"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_empty_mapping_is_attr_missing() {
        let (mut d, path) = dispatcher("update-empty-map");
        let id = run_ok(&mut d, "create User");
        assert_eq!(
            run_err(&mut d, &format!("User.update({}, {{}})", id)),
            "** attribute name missing **"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_skips_lifecycle_fields() {
        let (mut d, path) = dispatcher("update-lifecycle");
        let id = run_ok(&mut d, "create User");
        run_ok(&mut d, &format!("update User {} id hijacked", id));
        let entity = d.store().lookup("User", &id).unwrap();
        assert_eq!(entity.id(), id);
        assert_eq!(entity.get("id"), None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_persists_immediately() {
        let (mut d, path) = dispatcher("update-persist");
        let id = run_ok(&mut d, "create User");
        run_ok(&mut d, &format!("update User {} first_name Betty", id));

        let registry = EntityRegistry::builtin();
        let mut reloaded = ObjectStore::new(&path);
        reloaded.load(&registry).unwrap();
        let entity = reloaded.lookup("User", &id).unwrap();
        assert_eq!(entity.get("first_name"), Some(&FieldValue::Text("Betty".into())));
        let _ = std::fs::remove_file(&path);
    }

    // --- all ---

    #[test]
    fn all_on_an_empty_store_prints_nothing() {
        let (mut d, path) = dispatcher("all-empty");
        assert_eq!(run_ok(&mut d, "all"), "");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn all_lists_one_entity_per_line() {
        let (mut d, path) = dispatcher("all-list");
        let first = run_ok(&mut d, "create User");
        let second = run_ok(&mut d, "create State");
        let out = run_ok(&mut d, "all");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(&first));
        assert!(lines[1].contains(&second));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn all_filters_by_class() {
        let (mut d, path) = dispatcher("all-filter");
        run_ok(&mut d, "create User");
        run_ok(&mut d, "create State");
        let out = run_ok(&mut d, "all User");
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("[User]"));

        let dotted = run_ok(&mut d, "User.all()");
        assert_eq!(dotted, out);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn all_with_unknown_class_is_an_error() {
        let (mut d, path) = dispatcher("all-unknown");
        run_ok(&mut d, "create User");
        assert_eq!(run_err(&mut d, "all MyModel"), "** class doesn't exist **");
        assert_eq!(run_err(&mut d, "MyModel.all()"), "** class doesn't exist **");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn bare_dot_all_lists_everything() {
        let (mut d, path) = dispatcher("all-bare-dot");
        run_ok(&mut d, "create User");
        run_ok(&mut d, "create State");
        assert_eq!(run_ok(&mut d, ".all()").lines().count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    // --- count ---

    #[test]
    fn count_reports_zero_without_instances() {
        let (mut d, path) = dispatcher("count-zero");
        assert_eq!(run_ok(&mut d, "count User"), "0");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn count_tallies_creates_from_both_grammars() {
        let (mut d, path) = dispatcher("count-mixed");
        run_ok(&mut d, "create User");
        run_ok(&mut d, "User.create()");
        run_ok(&mut d, "create State");
        assert_eq!(run_ok(&mut d, "count User"), "2");
        assert_eq!(run_ok(&mut d, "User.count()"), "2");
        assert_eq!(run_ok(&mut d, "count State"), "1");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn count_without_class_is_missing() {
        let (mut d, path) = dispatcher("count-missing");
        assert_eq!(run_err(&mut d, "count"), "** class name missing **");
        assert_eq!(run_err(&mut d, ".count()"), "** class name missing **");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn count_unknown_class_prints_zero() {
        let (mut d, path) = dispatcher("count-unknown");
        run_ok(&mut d, "create User");
        assert_eq!(run_ok(&mut d, "MyModel.count()"), "0");
        assert_eq!(run_ok(&mut d, "count MyModel"), "0");
        let _ = std::fs::remove_file(&path);
    }

    // --- grammar parity ---

    #[test]
    fn both_grammars_produce_identical_responses() {
        let (mut d, path) = dispatcher("parity");
        let id = run_ok(&mut d, "create User");

        let canonical = run(&mut d, &format!("show User {}", id));
        let method = run(&mut d, &format!("User.show({})", id));
        assert_eq!(canonical, method);

        let canonical = run(&mut d, "show User nope");
        let method = run(&mut d, "User.show(nope)");
        assert_eq!(canonical, method);

        let canonical = run(&mut d, "count User");
        let method = run(&mut d, "User.count()");
        assert_eq!(canonical, method);
        let _ = std::fs::remove_file(&path);
    }

    // --- end to end ---

    #[test]
    fn create_update_destroy_walkthrough() {
        let (mut d, path) = dispatcher("walkthrough");
        let id = run_ok(&mut d, "create User");

        let shown = run_ok(&mut d, &format!("show User {}", id));
        assert!(shown.contains(&format!("id: {:?}", id)));

        run_ok(&mut d, &format!("User.update({}, nickname, 'Al')", id));
        let entity = d.store().lookup("User", &id).unwrap();
        assert_eq!(entity.get("nickname"), Some(&FieldValue::Text("Al".into())));

        run_ok(&mut d, &format!("destroy User {}", id));
        assert_eq!(
            run_err(&mut d, &format!("show User {}", id)),
            "** no instance found **"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn attribute_types_survive_a_reload() {
        let (mut d, path) = dispatcher("reload");
        let id = run_ok(&mut d, "create Place");
        run_ok(
            &mut d,
            &format!("Place.update({}, {{'max_guest': 98, 'latitude': 9.8}})", id),
        );
        run_ok(&mut d, &format!("update Place {} price_by_night 120", id));
        drop(d);

        let registry = EntityRegistry::builtin();
        let mut store = ObjectStore::new(&path);
        store.load(&registry).unwrap();
        let mut d = Dispatcher::new(registry, store);

        let entity = d.store().lookup("Place", &id).unwrap();
        assert_eq!(entity.get("max_guest"), Some(&FieldValue::Int(98)));
        assert_eq!(entity.get("latitude"), Some(&FieldValue::Float(9.8)));
        assert_eq!(entity.get("price_by_night"), Some(&FieldValue::Text("120".into())));

        assert_eq!(run_ok(&mut d, "count Place"), "1");
        let _ = std::fs::remove_file(&path);
    }
}

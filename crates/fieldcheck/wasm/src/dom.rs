//! DOM presenter backed by web-sys

use fieldcheck_core::{ControllerConfig, FieldKey, FieldRef, FieldState, Presenter, PresenterError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement};

/// Presenter that renders validation feedback into the page
///
/// Error messages are `div`s inserted right after the field and tagged with
/// the validation identity; state classes go on the closest field group.
pub struct DomPresenter {
    document: Document,
    config: ControllerConfig,
}

impl DomPresenter {
    pub fn new(config: ControllerConfig) -> Result<Self, PresenterError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| PresenterError::Dom("no document available".to_string()))?;
        Ok(Self { document, config })
    }

    fn find_field(&self, field: &FieldRef) -> Result<Element, PresenterError> {
        if let Some(element) = field.id.as_deref().and_then(|id| self.document.get_element_by_id(id)) {
            return Ok(element);
        }
        if let Some(name) = field.name.as_deref() {
            let selector = format!("[name=\"{}\"]", escape_attr(name));
            if let Some(element) = self.document.query_selector(&selector).map_err(dom_err)? {
                return Ok(element);
            }
        }
        Err(PresenterError::FieldNotFound(field.label()))
    }

    fn find_error_node(&self, key: &FieldKey) -> Result<Option<Element>, PresenterError> {
        let attribute = &self.config.identity_attribute;
        let token = key.to_string();
        let nodes = self
            .document
            .query_selector_all(&format!("[{}]", attribute))
            .map_err(dom_err)?;

        for index in 0..nodes.length() {
            let Some(element) = nodes.item(index).and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            if element.get_attribute(attribute).as_deref() == Some(token.as_str()) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }
}

impl Presenter for DomPresenter {
    fn show_field_error(
        &mut self,
        field: &FieldRef,
        key: &FieldKey,
        message: &str,
    ) -> Result<(), PresenterError> {
        let element = self.find_field(field)?;
        let node = self.document.create_element("div").map_err(dom_err)?;
        node.set_class_name(&self.config.error_message_class);
        node.set_attribute(&self.config.identity_attribute, &key.to_string())
            .map_err(dom_err)?;
        node.set_text_content(Some(message));
        element.after_with_node_1(&node).map_err(dom_err)
    }

    fn clear_field_error(&mut self, key: &FieldKey) -> Result<(), PresenterError> {
        if let Some(node) = self.find_error_node(key)? {
            node.remove();
        }
        Ok(())
    }

    fn has_field_error(&self, key: &FieldKey) -> Result<bool, PresenterError> {
        Ok(self.find_error_node(key)?.is_some())
    }

    fn field_has_errors(&self, field: &FieldRef) -> Result<bool, PresenterError> {
        let element = self.find_field(field)?;
        let Some(parent) = element.parent_element() else {
            return Ok(false);
        };
        let siblings = parent
            .query_selector_all(&format!(":scope > [{}]", self.config.identity_attribute))
            .map_err(dom_err)?;
        Ok(siblings.length() > 0)
    }

    fn mark_field_state(
        &mut self,
        field: &FieldRef,
        state: FieldState,
    ) -> Result<(), PresenterError> {
        let element = self.find_field(field)?;
        let Some(group) = element.closest(&self.config.group_selector).map_err(dom_err)? else {
            return Ok(());
        };

        let (add, remove) = match state {
            FieldState::Error => (&self.config.error_class, &self.config.success_class),
            FieldState::Success => (&self.config.success_class, &self.config.error_class),
        };
        let classes = group.class_list();
        classes.remove_1(remove).map_err(dom_err)?;
        classes.add_1(add).map_err(dom_err)
    }

    fn set_field_value(&mut self, field: &FieldRef, value: &str) -> Result<(), PresenterError> {
        let element = self.find_field(field)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
            return Ok(());
        }
        if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
            textarea.set_value(value);
            return Ok(());
        }
        Err(PresenterError::Dom(format!("{} does not hold a value", field.label())))
    }

    fn submit_form(&mut self, form: &str) -> Result<(), PresenterError> {
        let element = match self.document.get_element_by_id(form) {
            Some(element) => element,
            None => self
                .document
                .query_selector(form)
                .map_err(dom_err)?
                .ok_or_else(|| PresenterError::FormNotFound(form.to_string()))?,
        };
        let form_element = element
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| PresenterError::FormNotFound(form.to_string()))?;
        form_element.submit().map_err(dom_err)
    }
}

fn dom_err(err: JsValue) -> PresenterError {
    PresenterError::Dom(format!("{:?}", err))
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

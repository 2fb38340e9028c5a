//! 菜品选项校验

use shared::models::MenuOptionCatalog;
use shared::order::{ItemOptions, OrderItem};
use shared::{AppError, AppResult, ErrorCode};

/// 冰淇淋口味数量上限的默认值
pub const DEFAULT_MAX_CHOICES: u32 = 3;

fn invalid(message: impl Into<String>, item: &OrderItem) -> AppError {
    AppError::with_message(ErrorCode::InvalidItemOptions, message)
        .with_detail("menu_item_id", item.menu_item_id.clone())
}

/// 校验选项是否符合菜品的选项标记和选项目录
pub fn validate_options(
    item: &OrderItem,
    options: &ItemOptions,
    catalog: &MenuOptionCatalog,
) -> AppResult<()> {
    if !options.wing_sauces.is_empty() {
        if !item.has_wings {
            return Err(invalid("Este producto no lleva salsa de alitas", item));
        }
        if let Some(unknown) = options
            .wing_sauces
            .iter()
            .find(|s| !catalog.wing_sauces.iter().any(|c| &c.key == *s))
        {
            return Err(invalid(format!("Salsa desconocida: {unknown}"), item));
        }
    }

    if !options.fry_sauces.is_empty() {
        if !item.has_fries {
            return Err(invalid("Este producto no lleva papas", item));
        }
        if let Some(unknown) = options
            .fry_sauces
            .iter()
            .find(|s| !catalog.fry_sauces.iter().any(|c| &c.key == *s))
        {
            return Err(invalid(format!("Salsa desconocida: {unknown}"), item));
        }
    }

    if let Some(choice) = &options.submenu_choice {
        let allowed = item
            .submenu_key
            .as_ref()
            .and_then(|key| catalog.submenu_choices.get(key));
        match allowed {
            None => return Err(invalid("Este producto no tiene submenú", item)),
            Some(choices) if !choices.contains(choice) => {
                return Err(invalid(format!("Opción desconocida: {choice}"), item));
            }
            Some(_) => {}
        }
    }

    if !options.gelato_flavors.is_empty() {
        let Some(max) = item.max_choices else {
            return Err(invalid("Este producto no tiene sabores", item));
        };
        let limit = if max == 0 { DEFAULT_MAX_CHOICES } else { max };
        if options.gelato_flavors.len() > limit as usize {
            return Err(invalid(format!("Máximo {limit} sabores"), item));
        }
        if let Some(unknown) = options
            .gelato_flavors
            .iter()
            .find(|f| !catalog.gelato_flavors.contains(*f))
        {
            return Err(invalid(format!("Sabor desconocido: {unknown}"), item));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::MenuItem;

    fn item(json: serde_json::Value) -> OrderItem {
        let menu: MenuItem = serde_json::from_value(json).unwrap();
        OrderItem::from_menu_item(&menu)
    }

    fn wings() -> OrderItem {
        item(serde_json::json!({
            "id": "m-alitas", "name": "Alitas", "category": "Alitas", "price": 22000,
            "hasWings": true
        }))
    }

    fn gelato(max: u32) -> OrderItem {
        item(serde_json::json!({
            "id": "m-gelato", "name": "Helado", "category": "Postres", "price": 9000,
            "maxChoices": max
        }))
    }

    #[test]
    fn test_wing_sauces_need_flag_and_known_key() {
        let catalog = MenuOptionCatalog::default();
        let ok = ItemOptions {
            wing_sauces: vec!["bbq".into(), "teriyaki".into()],
            ..Default::default()
        };
        assert!(validate_options(&wings(), &ok, &catalog).is_ok());

        let unknown = ItemOptions {
            wing_sauces: vec!["ketchup".into()],
            ..Default::default()
        };
        let err = validate_options(&wings(), &unknown, &catalog).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidItemOptions);

        let fries_on_wings = ItemOptions {
            fry_sauces: vec!["ajo".into()],
            ..Default::default()
        };
        assert!(validate_options(&wings(), &fries_on_wings, &catalog).is_err());
    }

    #[test]
    fn test_submenu_choice_must_be_listed() {
        let catalog = MenuOptionCatalog::default();
        let combo = item(serde_json::json!({
            "id": "m-combo", "name": "Combo", "category": "Perros", "price": 16000,
            "submenuKey": "bebida"
        }));
        let ok = ItemOptions {
            submenu_choice: Some("Sprite".into()),
            ..Default::default()
        };
        assert!(validate_options(&combo, &ok, &catalog).is_ok());

        let bad = ItemOptions {
            submenu_choice: Some("Cerveza".into()),
            ..Default::default()
        };
        assert!(validate_options(&combo, &bad, &catalog).is_err());
        assert!(validate_options(&wings(), &ok, &catalog).is_err());
    }

    #[test]
    fn test_gelato_limit() {
        let catalog = MenuOptionCatalog::default();
        let three = ItemOptions {
            gelato_flavors: vec!["Vainilla".into(), "Fresa".into(), "Chocolate".into()],
            ..Default::default()
        };
        assert!(validate_options(&gelato(3), &three, &catalog).is_ok());
        assert!(validate_options(&gelato(2), &three, &catalog).is_err());
        // 0 falls back to the default limit
        assert!(validate_options(&gelato(0), &three, &catalog).is_ok());
        assert!(validate_options(&wings(), &three, &catalog).is_err());
    }

    #[test]
    fn test_empty_selection_is_valid() {
        let catalog = MenuOptionCatalog::default();
        assert!(validate_options(&wings(), &ItemOptions::default(), &catalog).is_ok());
    }
}

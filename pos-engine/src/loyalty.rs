//! 会员积分
//!
//! 结账时按电话号码匹配顾客：已有顾客累加消费、到店次数和积分并重新评估
//! 等级；新号码创建顾客档案。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{Customer, LoyaltySettings, LoyaltyTier};
use shared::order::CustomerContact;
use shared::util::generate_id;

/// 一次结账对会员档案的影响
#[derive(Debug, Clone, PartialEq)]
pub struct LoyaltyOutcome {
    pub customer: Customer,
    pub created: bool,
    pub points_earned: i64,
    /// 已有顾客升/降级后的新等级
    pub new_tier: Option<LoyaltyTier>,
}

/// 把一笔销售计入会员档案；积分功能关闭时不做任何事
pub fn apply_sale(
    customers: &mut Vec<Customer>,
    settings: &LoyaltySettings,
    contact: &CustomerContact,
    total: Decimal,
    site_id: &str,
    at: DateTime<Utc>,
) -> Option<LoyaltyOutcome> {
    if !settings.enabled {
        return None;
    }
    let points_earned = settings.points_for(total);

    if let Some(customer) = customers.iter_mut().find(|c| c.phone == contact.phone) {
        customer.total_spent += total;
        customer.visit_count += 1;
        customer.last_visit = at;
        customer.loyalty_points += points_earned;
        if customer.address.is_none() {
            customer.address = contact.address.clone();
        }

        let tier = settings.tier_for(customer.loyalty_points).cloned();
        let tier_id = tier.as_ref().map(|t| t.id.clone());
        let new_tier = if tier_id != customer.loyalty_tier_id {
            customer.loyalty_tier_id = tier_id;
            tier
        } else {
            None
        };
        tracing::debug!(customer_id = %customer.id, points_earned, "Loyalty points added");
        return Some(LoyaltyOutcome {
            customer: customer.clone(),
            created: false,
            points_earned,
            new_tier,
        });
    }

    let customer = Customer {
        id: generate_id("cust"),
        name: contact.name.clone(),
        phone: contact.phone.clone(),
        address: contact.address.clone(),
        total_spent: total,
        visit_count: 1,
        last_visit: at,
        loyalty_points: points_earned,
        loyalty_tier_id: settings.tier_for(points_earned).map(|t| t.id.clone()),
        site_id: site_id.to_string(),
    };
    tracing::debug!(customer_id = %customer.id, points_earned, "Customer created from sale");
    customers.push(customer.clone());
    Some(LoyaltyOutcome {
        customer,
        created: true,
        points_earned,
        new_tier: None,
    })
}

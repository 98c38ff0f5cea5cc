//! Permission rules for ticket operations, kept in one place instead of
//! being re-derived inside each handler.

use crate::models::ticket::UpdateTicketReq;
use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketField {
    Title,
    Description,
    Status,
    Priority,
    Category,
}

/// Fields a role may change through the update operation. The assignee is
/// never in this set; it only changes through the assignment operation.
pub fn updatable_fields(role: Role) -> &'static [TicketField] {
    match role {
        Role::Consultant => &[TicketField::Title, TicketField::Description],
        Role::Manager | Role::Dev => &[
            TicketField::Title,
            TicketField::Description,
            TicketField::Status,
            TicketField::Priority,
            TicketField::Category,
        ],
    }
}

/// Visibility filter for list: consultants are pinned to their own tickets,
/// managers and devs see everything.
pub fn list_scope(role: Role, caller_id: i64) -> Option<i64> {
    match role {
        Role::Consultant => Some(caller_id),
        Role::Manager | Role::Dev => None,
    }
}

/// Whether the caller may read or modify a single ticket. Consultants only
/// touch tickets they created.
pub fn can_access(role: Role, caller_id: i64, created_by: i64) -> bool {
    match role {
        Role::Consultant => caller_id == created_by,
        Role::Manager | Role::Dev => true,
    }
}

/// Drops every request field outside the role's allow-list. Out-of-list
/// fields are ignored, not rejected.
pub fn filter_update(role: Role, mut req: UpdateTicketReq) -> UpdateTicketReq {
    let allowed = updatable_fields(role);
    if !allowed.contains(&TicketField::Title) {
        req.title = None;
    }
    if !allowed.contains(&TicketField::Description) {
        req.description = None;
    }
    if !allowed.contains(&TicketField::Status) {
        req.status = None;
    }
    if !allowed.contains(&TicketField::Priority) {
        req.priority = None;
    }
    if !allowed.contains(&TicketField::Category) {
        req.category = None;
    }
    req
}
